//! Clone (C6): materialize a remote snapshot into a target directory via
//! AtomicStager + StatusEngine (§4.6).

use std::path::Path;

use rayon::prelude::*;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::remote::{GetContentParams, ListFilesParams, RemoteStore};
use crate::stage::do_atomically;
use crate::status::{ItemStatus, ItemStatusManager, ModifiedWhere};
use crate::types::ValItemType;

pub struct CloneParams<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub branch_id: uuid::Uuid,
    pub version: u64,
    pub ignore_rules: &'a IgnoreRules,
    pub dry_run: bool,
    pub overwrite: bool,
    /// Bounded in-flight remote ops (§4.6: "suggested 5-10").
    pub concurrency: usize,
}

pub fn clone(params: CloneParams<'_>, remote: &dyn RemoteStore) -> Result<ItemStatusManager, EngineError> {
    do_atomically(params.target_dir, "valsync-clone", |scratch| {
        let items = remote.list_files(
            params.val_id,
            ListFilesParams {
                branch_id: params.branch_id,
                version: params.version,
                path: None,
                recursive: true,
            },
        )?;

        let items: Vec<_> = items
            .into_iter()
            .filter(|item| {
                !params
                    .ignore_rules
                    .is_ignored(Path::new(&item.path), item.is_directory())
            })
            .collect();

        for item in items.iter().filter(|i| i.is_directory()) {
            std::fs::create_dir_all(scratch.join(&item.path))?;
        }

        let files: Vec<_> = items.into_iter().filter(|i| !i.is_directory()).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.concurrency.max(1))
            .build()
            .map_err(|e| EngineError::programmer(e.to_string()))?;

        let results: Vec<Result<ItemStatus, EngineError>> = pool.install(|| {
            files
                .par_iter()
                .map(|remote_item| -> Result<ItemStatus, EngineError> {
                    let local_path = params.target_dir.join(&remote_item.path);
                    let local_exists = local_path.exists();

                    if local_exists && !params.overwrite {
                        copy_local_preserving_mtime(&local_path, &scratch.join(&remote_item.path))?;
                        return Ok(ItemStatus::NotModified {
                            path: remote_item.path.clone(),
                            item_type: remote_item.item_type,
                            content: None,
                        });
                    }

                    if !local_exists {
                        let content = remote.get_content(
                            params.val_id,
                            GetContentParams {
                                path: remote_item.path.clone(),
                                branch_id: params.branch_id,
                                version: params.version,
                            },
                        )?;
                        write_with_mtime(&scratch.join(&remote_item.path), &content, remote_item.updated_at.into())?;
                        return Ok(ItemStatus::Created {
                            path: remote_item.path.clone(),
                            item_type: remote_item.item_type,
                            mtime: remote_item.updated_at.into(),
                            content: None,
                            warnings: Vec::new(),
                        });
                    }

                    let local_bytes = std::fs::read(&local_path)?;
                    let remote_content = remote.get_content(
                        params.val_id,
                        GetContentParams {
                            path: remote_item.path.clone(),
                            branch_id: params.branch_id,
                            version: params.version,
                        },
                    )?;

                    if local_bytes == remote_content {
                        copy_local_preserving_mtime(&local_path, &scratch.join(&remote_item.path))?;
                        Ok(ItemStatus::NotModified {
                            path: remote_item.path.clone(),
                            item_type: remote_item.item_type,
                            content: None,
                        })
                    } else {
                        write_with_mtime(
                            &scratch.join(&remote_item.path),
                            &remote_content,
                            remote_item.updated_at.into(),
                        )?;
                        Ok(ItemStatus::Modified {
                            path: remote_item.path.clone(),
                            item_type: remote_item.item_type,
                            content: None,
                            location: ModifiedWhere::Remote,
                            warnings: Vec::new(),
                        })
                    }
                })
                .collect()
        });

        let mut manager = ItemStatusManager::new();
        for result in results {
            manager.insert(result?)?;
        }
        for dir_path in scratch_dirs(scratch)? {
            manager.insert(ItemStatus::Created {
                path: dir_path,
                item_type: ValItemType::Directory,
                mtime: std::time::SystemTime::now(),
                content: None,
                warnings: Vec::new(),
            })?;
        }

        Ok((manager, !params.dry_run))
    })
}

fn scratch_dirs(scratch: &Path) -> Result<Vec<String>, EngineError> {
    let mut out = Vec::new();
    let mut stack = vec![scratch.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let rel = entry.path().strip_prefix(scratch).unwrap().to_path_buf();
                out.push(crate::path::to_item_path(&rel));
                stack.push(entry.path());
            }
        }
    }
    Ok(out)
}

fn write_with_mtime(dest: &Path, content: &[u8], mtime: std::time::SystemTime) -> Result<(), EngineError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, content)?;
    filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime)).ok();
    Ok(())
}

fn copy_local_preserving_mtime(src: &Path, dest: &Path) -> Result<(), EngineError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    reflink_copy::reflink_or_copy(src, dest)?;
    let metadata = std::fs::metadata(src)?;
    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dest, mtime).ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{
        CreateBranchParams, CreateFileParams, CreateValParams, DeleteFileParams, UpdateFileParams,
        UserProfile,
    };
    use crate::types::{BranchMeta, ValItem, ValMeta};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeStore {
        files: Mutex<HashMap<String, (ValItem, Vec<u8>)>>,
    }

    impl FakeStore {
        fn new(files: Vec<(ValItem, Vec<u8>)>) -> Self {
            Self {
                files: Mutex::new(files.into_iter().map(|(i, b)| (i.path.clone(), (i, b))).collect()),
            }
        }
    }

    impl RemoteStore for FakeStore {
        fn retrieve_val(&self, _v: uuid::Uuid) -> Result<ValMeta, EngineError> {
            unimplemented!()
        }
        fn create_val(&self, _p: CreateValParams) -> Result<ValMeta, EngineError> {
            unimplemented!()
        }
        fn delete_val(&self, _v: uuid::Uuid) -> Result<(), EngineError> {
            unimplemented!()
        }
        fn list_branches(&self, _v: uuid::Uuid) -> Result<Vec<BranchMeta>, EngineError> {
            unimplemented!()
        }
        fn retrieve_branch(&self, _v: uuid::Uuid, _b: uuid::Uuid) -> Result<BranchMeta, EngineError> {
            unimplemented!()
        }
        fn create_branch(&self, _v: uuid::Uuid, _p: CreateBranchParams) -> Result<BranchMeta, EngineError> {
            unimplemented!()
        }
        fn delete_branch(&self, _v: uuid::Uuid, _b: uuid::Uuid) -> Result<(), EngineError> {
            unimplemented!()
        }
        fn list_files(&self, _v: uuid::Uuid, _p: ListFilesParams) -> Result<Vec<ValItem>, EngineError> {
            Ok(self.files.lock().unwrap().values().map(|(i, _)| i.clone()).collect())
        }
        fn get_content(&self, _v: uuid::Uuid, params: GetContentParams) -> Result<Vec<u8>, EngineError> {
            self.files
                .lock()
                .unwrap()
                .get(&params.path)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| EngineError::not_found(params.path))
        }
        fn create_file(&self, _v: uuid::Uuid, _p: CreateFileParams) -> Result<ValItem, EngineError> {
            unimplemented!()
        }
        fn update_file(
            &self,
            _v: uuid::Uuid,
            _path: &str,
            _b: uuid::Uuid,
            _p: UpdateFileParams,
        ) -> Result<(), EngineError> {
            unimplemented!()
        }
        fn delete_file(&self, _v: uuid::Uuid, _p: DeleteFileParams) -> Result<(), EngineError> {
            unimplemented!()
        }
        fn resolve_alias(&self, _u: &str, _n: &str) -> Result<ValMeta, EngineError> {
            unimplemented!()
        }
        fn me(&self) -> Result<UserProfile, EngineError> {
            unimplemented!()
        }
    }

    // S1: clone materializes remote files with correct content.
    #[test]
    fn clone_writes_remote_files_to_disk() {
        let target = tempfile::tempdir().unwrap();
        let now = chrono::Utc::now();
        let store = FakeStore::new(vec![
            (
                ValItem {
                    path: "readme.md".to_string(),
                    name: "readme.md".to_string(),
                    item_type: ValItemType::File,
                    updated_at: now,
                },
                b"# hi".to_vec(),
            ),
            (
                ValItem {
                    path: "api/hello.ts".to_string(),
                    name: "hello.ts".to_string(),
                    item_type: ValItemType::Script,
                    updated_at: now,
                },
                b"export default () => new Response(\"ok\")".to_vec(),
            ),
        ]);
        let rules = IgnoreRules::build(target.path(), &[], None).unwrap();

        clone(
            CloneParams {
                target_dir: target.path(),
                val_id: uuid::Uuid::new_v4(),
                branch_id: uuid::Uuid::new_v4(),
                version: 1,
                ignore_rules: &rules,
                dry_run: false,
                overwrite: true,
                concurrency: 5,
            },
            &store,
        )
        .unwrap();

        assert_eq!(std::fs::read(target.path().join("readme.md")).unwrap(), b"# hi");
        assert_eq!(
            std::fs::read(target.path().join("api/hello.ts")).unwrap(),
            b"export default () => new Response(\"ok\")"
        );
    }

    #[test]
    fn dry_run_clone_does_not_write_files() {
        let target = tempfile::tempdir().unwrap();
        let store = FakeStore::new(vec![(
            ValItem {
                path: "a.txt".to_string(),
                name: "a.txt".to_string(),
                item_type: ValItemType::File,
                updated_at: chrono::Utc::now(),
            },
            b"x".to_vec(),
        )]);
        let rules = IgnoreRules::build(target.path(), &[], None).unwrap();

        clone(
            CloneParams {
                target_dir: target.path(),
                val_id: uuid::Uuid::new_v4(),
                branch_id: uuid::Uuid::new_v4(),
                version: 1,
                ignore_rules: &rules,
                dry_run: true,
                overwrite: true,
                concurrency: 5,
            },
            &store,
        )
        .unwrap();

        assert!(!target.path().join("a.txt").exists());
    }
}
