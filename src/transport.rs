//! Placeholder `RemoteStore` backing the `valsync` binary.
//!
//! Remote API transport, authentication, and pagination are out of scope for
//! the engine (§1): the engine only consumes the `RemoteStore` trait. This
//! struct is the seam where a real HTTP client would live; it returns a
//! `Transport` error for every call so the CLI links and runs end to end
//! against the engine without a fabricated network stack.

use crate::error::EngineError;
use crate::remote::{
    CreateBranchParams, CreateFileParams, CreateValParams, DeleteFileParams, GetContentParams,
    ListFilesParams, RemoteStore, UpdateFileParams, UserProfile,
};
use crate::types::{BranchMeta, ValItem, ValMeta};

pub struct UnconfiguredRemote;

fn unimplemented() -> EngineError {
    EngineError::transport("no remote transport is configured in this build")
}

impl RemoteStore for UnconfiguredRemote {
    fn retrieve_val(&self, _val_id: uuid::Uuid) -> Result<ValMeta, EngineError> {
        Err(unimplemented())
    }
    fn create_val(&self, _params: CreateValParams) -> Result<ValMeta, EngineError> {
        Err(unimplemented())
    }
    fn delete_val(&self, _val_id: uuid::Uuid) -> Result<(), EngineError> {
        Err(unimplemented())
    }
    fn list_branches(&self, _val_id: uuid::Uuid) -> Result<Vec<BranchMeta>, EngineError> {
        Err(unimplemented())
    }
    fn retrieve_branch(&self, _val_id: uuid::Uuid, _branch_id: uuid::Uuid) -> Result<BranchMeta, EngineError> {
        Err(unimplemented())
    }
    fn create_branch(&self, _val_id: uuid::Uuid, _params: CreateBranchParams) -> Result<BranchMeta, EngineError> {
        Err(unimplemented())
    }
    fn delete_branch(&self, _val_id: uuid::Uuid, _branch_id: uuid::Uuid) -> Result<(), EngineError> {
        Err(unimplemented())
    }
    fn list_files(&self, _val_id: uuid::Uuid, _params: ListFilesParams) -> Result<Vec<ValItem>, EngineError> {
        Err(unimplemented())
    }
    fn get_content(&self, _val_id: uuid::Uuid, _params: GetContentParams) -> Result<Vec<u8>, EngineError> {
        Err(unimplemented())
    }
    fn create_file(&self, _val_id: uuid::Uuid, _params: CreateFileParams) -> Result<ValItem, EngineError> {
        Err(unimplemented())
    }
    fn update_file(
        &self,
        _val_id: uuid::Uuid,
        _path: &str,
        _branch_id: uuid::Uuid,
        _params: UpdateFileParams,
    ) -> Result<(), EngineError> {
        Err(unimplemented())
    }
    fn delete_file(&self, _val_id: uuid::Uuid, _params: DeleteFileParams) -> Result<(), EngineError> {
        Err(unimplemented())
    }
    fn resolve_alias(&self, _username: &str, _val_name: &str) -> Result<ValMeta, EngineError> {
        Err(unimplemented())
    }
    fn me(&self) -> Result<UserProfile, EngineError> {
        Err(unimplemented())
    }
}
