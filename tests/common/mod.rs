//! In-memory `RemoteStore` shared by the end-to-end scenario tests. Each
//! branch owns its own file table and version counter; every mutating call
//! bumps that branch's version by one, which is enough to exercise the
//! monotonic-version invariant without modeling the remote's real commit
//! batching.

use std::collections::HashMap;
use std::sync::Mutex;

use valsync::error::EngineError;
use valsync::remote::{
    CreateBranchParams, CreateFileParams, CreateValParams, DeleteFileParams, GetContentParams,
    ListFilesParams, RemoteStore, UpdateFileParams, UserProfile,
};
use valsync::types::{BranchMeta, Privacy, ValItem, ValItemType, ValMeta};

struct BranchData {
    meta: BranchMeta,
    files: HashMap<String, (ValItem, Vec<u8>)>,
}

struct ValData {
    meta: ValMeta,
    branches: Vec<BranchData>,
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    vals: Mutex<HashMap<uuid::Uuid, ValData>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a new val with a single `main` branch at version 1 containing
    /// `files`. Returns `(val_id, branch_id)`.
    pub fn seed_val(&self, author: &str, name: &str, files: Vec<(&str, ValItemType, &[u8])>) -> (uuid::Uuid, uuid::Uuid) {
        let val_id = uuid::Uuid::new_v4();
        let branch_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let table = files
            .into_iter()
            .map(|(path, item_type, bytes)| {
                let item = ValItem { path: path.to_string(), name: path.to_string(), item_type, updated_at: now };
                (path.to_string(), (item, bytes.to_vec()))
            })
            .collect();

        self.vals.lock().unwrap().insert(
            val_id,
            ValData {
                meta: ValMeta { id: val_id, name: name.to_string(), author: author.to_string(), privacy: Privacy::Private, description: None },
                branches: vec![BranchData { meta: BranchMeta { id: branch_id, name: "main".to_string(), version: 1 }, files: table }],
            },
        );

        (val_id, branch_id)
    }

    pub fn file_bytes(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid, path: &str) -> Option<Vec<u8>> {
        let vals = self.vals.lock().unwrap();
        let branch = vals.get(&val_id)?.branches.iter().find(|b| b.meta.id == branch_id)?;
        branch.files.get(path).map(|(_, bytes)| bytes.clone())
    }

    pub fn has_file(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid, path: &str) -> bool {
        self.file_bytes(val_id, branch_id, path).is_some()
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn retrieve_val(&self, val_id: uuid::Uuid) -> Result<ValMeta, EngineError> {
        self.vals
            .lock()
            .unwrap()
            .get(&val_id)
            .map(|v| v.meta.clone())
            .ok_or_else(|| EngineError::not_found(format!("val {val_id}")))
    }

    fn create_val(&self, params: CreateValParams) -> Result<ValMeta, EngineError> {
        let mut vals = self.vals.lock().unwrap();
        if vals.values().any(|v| v.meta.name == params.name) {
            return Err(EngineError::conflict(params.name));
        }

        let val_id = uuid::Uuid::new_v4();
        let branch_id = uuid::Uuid::new_v4();
        let meta = ValMeta { id: val_id, name: params.name, author: "tester".to_string(), privacy: params.privacy, description: params.description };

        vals.insert(
            val_id,
            ValData {
                meta: meta.clone(),
                branches: vec![BranchData { meta: BranchMeta { id: branch_id, name: "main".to_string(), version: 1 }, files: HashMap::new() }],
            },
        );
        Ok(meta)
    }

    fn delete_val(&self, val_id: uuid::Uuid) -> Result<(), EngineError> {
        self.vals.lock().unwrap().remove(&val_id);
        Ok(())
    }

    fn list_branches(&self, val_id: uuid::Uuid) -> Result<Vec<BranchMeta>, EngineError> {
        let vals = self.vals.lock().unwrap();
        let data = vals.get(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        Ok(data.branches.iter().map(|b| b.meta.clone()).collect())
    }

    fn retrieve_branch(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid) -> Result<BranchMeta, EngineError> {
        let vals = self.vals.lock().unwrap();
        let data = vals.get(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        data.branches
            .iter()
            .find(|b| b.meta.id == branch_id)
            .map(|b| b.meta.clone())
            .ok_or_else(|| EngineError::not_found(format!("branch {branch_id}")))
    }

    fn create_branch(&self, val_id: uuid::Uuid, params: CreateBranchParams) -> Result<BranchMeta, EngineError> {
        let mut vals = self.vals.lock().unwrap();
        let data = vals.get_mut(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        if data.branches.iter().any(|b| b.meta.name == params.name) {
            return Err(EngineError::conflict(params.name));
        }

        let files = match params.branch_id {
            Some(source_id) => data
                .branches
                .iter()
                .find(|b| b.meta.id == source_id)
                .map(|b| b.files.clone())
                .unwrap_or_default(),
            None => HashMap::new(),
        };

        let new_branch = BranchData {
            meta: BranchMeta { id: uuid::Uuid::new_v4(), name: params.name, version: valsync::types::FIRST_VERSION_NUMBER },
            files,
        };
        let meta = new_branch.meta.clone();
        data.branches.push(new_branch);
        Ok(meta)
    }

    fn delete_branch(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid) -> Result<(), EngineError> {
        let mut vals = self.vals.lock().unwrap();
        if let Some(data) = vals.get_mut(&val_id) {
            data.branches.retain(|b| b.meta.id != branch_id);
        }
        Ok(())
    }

    fn list_files(&self, val_id: uuid::Uuid, params: ListFilesParams) -> Result<Vec<ValItem>, EngineError> {
        let vals = self.vals.lock().unwrap();
        let data = vals.get(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        let branch = data
            .branches
            .iter()
            .find(|b| b.meta.id == params.branch_id)
            .ok_or_else(|| EngineError::not_found(format!("branch {}", params.branch_id)))?;
        Ok(branch.files.values().map(|(item, _)| item.clone()).collect())
    }

    fn get_content(&self, val_id: uuid::Uuid, params: GetContentParams) -> Result<Vec<u8>, EngineError> {
        let vals = self.vals.lock().unwrap();
        let data = vals.get(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        let branch = data
            .branches
            .iter()
            .find(|b| b.meta.id == params.branch_id)
            .ok_or_else(|| EngineError::not_found(format!("branch {}", params.branch_id)))?;
        branch
            .files
            .get(&params.path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| EngineError::not_found(params.path))
    }

    fn create_file(&self, val_id: uuid::Uuid, params: CreateFileParams) -> Result<ValItem, EngineError> {
        let mut vals = self.vals.lock().unwrap();
        let data = vals.get_mut(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        let branch = data
            .branches
            .iter_mut()
            .find(|b| b.meta.id == params.branch_id)
            .ok_or_else(|| EngineError::not_found(format!("branch {}", params.branch_id)))?;

        if branch.files.contains_key(&params.path) {
            return Err(EngineError::conflict(params.path));
        }

        let item = ValItem {
            path: params.path.clone(),
            name: params.path.rsplit('/').next().unwrap_or(&params.path).to_string(),
            item_type: params.item_type,
            updated_at: chrono::Utc::now(),
        };
        branch.files.insert(params.path, (item.clone(), params.content.unwrap_or_default()));
        branch.meta.version += 1;
        Ok(item)
    }

    fn update_file(&self, val_id: uuid::Uuid, path: &str, branch_id: uuid::Uuid, params: UpdateFileParams) -> Result<(), EngineError> {
        let mut vals = self.vals.lock().unwrap();
        let data = vals.get_mut(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        let branch = data
            .branches
            .iter_mut()
            .find(|b| b.meta.id == branch_id)
            .ok_or_else(|| EngineError::not_found(format!("branch {branch_id}")))?;

        let (mut item, mut bytes) = branch
            .files
            .remove(path)
            .ok_or_else(|| EngineError::not_found(path.to_string()))?;

        if let Some(content) = params.content {
            bytes = content;
            item.updated_at = chrono::Utc::now();
        }
        if let Some(item_type) = params.item_type {
            item.item_type = item_type;
        }

        let new_path = match (&params.parent_path, &params.name) {
            (Some(parent), Some(name)) if !parent.is_empty() => format!("{parent}/{name}"),
            (Some(_), Some(name)) => name.clone(),
            _ => path.to_string(),
        };
        item.path = new_path.clone();
        if let Some(name) = params.name {
            item.name = name;
        }

        branch.files.insert(new_path, (item, bytes));
        branch.meta.version += 1;
        Ok(())
    }

    fn delete_file(&self, val_id: uuid::Uuid, params: DeleteFileParams) -> Result<(), EngineError> {
        let mut vals = self.vals.lock().unwrap();
        let data = vals.get_mut(&val_id).ok_or_else(|| EngineError::not_found(format!("val {val_id}")))?;
        let branch = data
            .branches
            .iter_mut()
            .find(|b| b.meta.id == params.branch_id)
            .ok_or_else(|| EngineError::not_found(format!("branch {}", params.branch_id)))?;
        branch.files.remove(&params.path);
        branch.meta.version += 1;
        Ok(())
    }

    fn resolve_alias(&self, username: &str, val_name: &str) -> Result<ValMeta, EngineError> {
        self.vals
            .lock()
            .unwrap()
            .values()
            .find(|v| v.meta.author == username && v.meta.name == val_name)
            .map(|v| v.meta.clone())
            .ok_or_else(|| EngineError::not_found(format!("{username}/{val_name}")))
    }

    fn me(&self) -> Result<UserProfile, EngineError> {
        Ok(UserProfile { username: "tester".to_string() })
    }
}
