//! The `RemoteStore` capability (§6.1): the engine's only collaborator
//! boundary. Argument parsing, HTTP transport, authentication, and pagination
//! all live on the other side of this trait — out of scope per §1.
//!
//! Implemented synchronously/blocking, matching the rest of the engine's
//! threaded (not async) suspension model (§5): a real implementation backs
//! this with blocking HTTP calls from a worker in the bounded pool, rather
//! than a reactor.

use crate::error::EngineError;
use crate::types::{BranchMeta, ValItem, ValItemType, ValMeta};

pub struct CreateValParams {
    pub name: String,
    pub description: Option<String>,
    pub privacy: crate::types::Privacy,
}

pub struct CreateBranchParams {
    pub name: String,
    pub branch_id: Option<uuid::Uuid>,
}

pub struct ListFilesParams {
    pub branch_id: uuid::Uuid,
    pub version: u64,
    pub path: Option<String>,
    pub recursive: bool,
}

pub struct GetContentParams {
    pub path: String,
    pub branch_id: uuid::Uuid,
    pub version: u64,
}

pub struct CreateFileParams {
    pub path: String,
    pub item_type: ValItemType,
    pub branch_id: uuid::Uuid,
    pub content: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct UpdateFileParams {
    pub content: Option<Vec<u8>>,
    pub name: Option<String>,
    pub parent_path: Option<String>,
    pub item_type: Option<ValItemType>,
}

pub struct DeleteFileParams {
    pub path: String,
    pub branch_id: uuid::Uuid,
    pub recursive: bool,
}

#[derive(Clone, Debug)]
pub struct UserProfile {
    pub username: String,
}

/// The exact operations the core needs on the remote (§6.1). No method here
/// is allowed to retry, prompt, or do pagination bookkeeping visible to the
/// caller — those concerns belong to whatever implements this trait.
pub trait RemoteStore: Send + Sync {
    fn retrieve_val(&self, val_id: uuid::Uuid) -> Result<ValMeta, EngineError>;
    fn create_val(&self, params: CreateValParams) -> Result<ValMeta, EngineError>;
    fn delete_val(&self, val_id: uuid::Uuid) -> Result<(), EngineError>;

    fn list_branches(&self, val_id: uuid::Uuid) -> Result<Vec<BranchMeta>, EngineError>;
    fn retrieve_branch(
        &self,
        val_id: uuid::Uuid,
        branch_id: uuid::Uuid,
    ) -> Result<BranchMeta, EngineError>;
    fn create_branch(
        &self,
        val_id: uuid::Uuid,
        params: CreateBranchParams,
    ) -> Result<BranchMeta, EngineError>;
    fn delete_branch(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid) -> Result<(), EngineError>;

    fn list_files(
        &self,
        val_id: uuid::Uuid,
        params: ListFilesParams,
    ) -> Result<Vec<ValItem>, EngineError>;
    fn get_content(
        &self,
        val_id: uuid::Uuid,
        params: GetContentParams,
    ) -> Result<Vec<u8>, EngineError>;
    fn create_file(
        &self,
        val_id: uuid::Uuid,
        params: CreateFileParams,
    ) -> Result<ValItem, EngineError>;
    fn update_file(
        &self,
        val_id: uuid::Uuid,
        path: &str,
        branch_id: uuid::Uuid,
        params: UpdateFileParams,
    ) -> Result<(), EngineError>;
    fn delete_file(&self, val_id: uuid::Uuid, params: DeleteFileParams) -> Result<(), EngineError>;

    fn resolve_alias(&self, username: &str, val_name: &str) -> Result<ValMeta, EngineError>;
    fn me(&self) -> Result<UserProfile, EngineError>;

    /// Convenience built on `list_branches` + `retrieve_branch`: the current
    /// head version of `branch_id`. Not part of the wire contract in §6.1,
    /// but every orchestration operation needs it (Pull, Push, Checkout).
    fn latest_version(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid) -> Result<u64, EngineError> {
        Ok(self.retrieve_branch(val_id, branch_id)?.version)
    }
}
