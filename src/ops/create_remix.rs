//! Create / Remix (C10): compose Clone+Push to produce a new remote val
//! from a directory, or from another val (§4.10).

use std::path::Path;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::ops::clone::{CloneParams, clone};
use crate::ops::push::{PushParams, push};
use crate::remote::{CreateValParams, ListFilesParams, RemoteStore, UpdateFileParams};
use crate::status::ItemStatusManager;
use crate::types::{Privacy, ValMeta};

pub struct CreateParams<'a> {
    pub source_dir: &'a Path,
    pub val_name: String,
    pub privacy: Option<Privacy>,
    pub description: Option<String>,
    pub ignore_rules: &'a IgnoreRules,
    pub do_upload: bool,
    pub concurrency: usize,
}

pub struct CreateOutcome {
    pub new_val: ValMeta,
    pub new_branch_id: uuid::Uuid,
    pub item_state_changes: ItemStatusManager,
}

/// Configured fallback when neither the caller nor a source val supplies a
/// privacy value (§4.10, "Rename and privacy defaults").
const DEFAULT_PRIVACY: Privacy = Privacy::Private;

pub fn create(params: CreateParams<'_>, remote: &dyn RemoteStore) -> Result<CreateOutcome, EngineError> {
    if !params.source_dir.exists() {
        return Err(EngineError::not_found(params.source_dir.display().to_string()));
    }

    let new_val = remote.create_val(CreateValParams {
        name: params.val_name,
        description: params.description,
        privacy: params.privacy.unwrap_or(DEFAULT_PRIVACY),
    })?;
    let default_branch = remote
        .list_branches(new_val.id)?
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::programmer("newly created val has no default branch"))?;

    let changes = if params.do_upload {
        push(
            PushParams {
                target_dir: params.source_dir,
                val_id: new_val.id,
                branch_id: default_branch.id,
                ignore_rules: params.ignore_rules,
                dry_run: false,
                concurrency: params.concurrency,
            },
            remote,
        )?
    } else {
        ItemStatusManager::new()
    };

    Ok(CreateOutcome {
        new_branch_id: default_branch.id,
        new_val,
        item_state_changes: changes,
    })
}

pub struct RemixParams<'a> {
    pub target_dir: &'a Path,
    pub src_val_id: uuid::Uuid,
    pub src_branch_id: uuid::Uuid,
    pub val_name: String,
    pub privacy: Option<Privacy>,
    pub description: Option<String>,
    pub ignore_rules: &'a IgnoreRules,
    pub concurrency: usize,
}

pub struct RemixOutcome {
    pub to_val_id: uuid::Uuid,
    pub to_branch_id: uuid::Uuid,
    pub to_version: u64,
    pub file_state_changes: ItemStatusManager,
}

pub fn remix(params: RemixParams<'_>, remote: &dyn RemoteStore) -> Result<RemixOutcome, EngineError> {
    let src_val = remote.retrieve_val(params.src_val_id)?;
    let src_branch = remote.retrieve_branch(params.src_val_id, params.src_branch_id)?;

    // Clone (src_val_id, src_branch_id, src_branch.version) into target_dir.
    let clone_changes = clone(
        CloneParams {
            target_dir: params.target_dir,
            val_id: params.src_val_id,
            branch_id: params.src_branch_id,
            version: src_branch.version,
            ignore_rules: params.ignore_rules,
            dry_run: false,
            overwrite: true,
            concurrency: params.concurrency,
        },
        remote,
    )?;

    // An explicit caller-supplied value always wins; otherwise the source
    // val's value applies; otherwise the configured default.
    let privacy = params.privacy.unwrap_or(src_val.privacy);
    let description = params.description.or_else(|| src_val.description.clone());

    let create_outcome = create(
        CreateParams {
            source_dir: params.target_dir,
            val_name: params.val_name,
            privacy: Some(privacy),
            description,
            ignore_rules: params.ignore_rules,
            do_upload: true,
            concurrency: params.concurrency,
        },
        remote,
    )?;

    // For every non-directory item in the source, issue update_type so the
    // new val's items carry the same type classification as the source.
    let src_items = remote.list_files(
        params.src_val_id,
        ListFilesParams {
            branch_id: params.src_branch_id,
            version: src_branch.version,
            path: None,
            recursive: true,
        },
    )?;

    for item in src_items.iter().filter(|i| !i.is_directory()) {
        remote.update_file(
            create_outcome.new_val.id,
            &item.path,
            create_outcome.new_branch_id,
            UpdateFileParams {
                item_type: Some(item.item_type),
                ..Default::default()
            },
        )?;
    }

    let to_version = remote.latest_version(create_outcome.new_val.id, create_outcome.new_branch_id)?;

    Ok(RemixOutcome {
        to_val_id: create_outcome.new_val.id,
        to_branch_id: create_outcome.new_branch_id,
        to_version,
        file_state_changes: clone_changes.merge(create_outcome.item_state_changes),
    })
}
