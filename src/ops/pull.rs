//! Pull (C7): Clone with `overwrite = true` against the latest (or pinned)
//! branch version (§4.7).

use std::path::Path;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::ops::clone::{CloneParams, clone};
use crate::remote::RemoteStore;
use crate::status::ItemStatusManager;

pub struct PullParams<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub branch_id: uuid::Uuid,
    /// Defaults to `latest(branch)` when absent.
    pub version: Option<u64>,
    pub ignore_rules: &'a IgnoreRules,
    pub dry_run: bool,
    pub concurrency: usize,
}

/// The version to advance `MetaStore.branch.version` to on commit: the
/// branch's latest version as of the pull, not necessarily the pinned
/// `version` requested (§4.7).
pub struct PullOutcome {
    pub changes: ItemStatusManager,
    pub landed_version: u64,
}

pub fn pull(params: PullParams<'_>, remote: &dyn RemoteStore) -> Result<PullOutcome, EngineError> {
    let latest = remote.latest_version(params.val_id, params.branch_id)?;
    let version = params.version.unwrap_or(latest);

    let changes = clone(
        CloneParams {
            target_dir: params.target_dir,
            val_id: params.val_id,
            branch_id: params.branch_id,
            version,
            ignore_rules: params.ignore_rules,
            dry_run: params.dry_run,
            overwrite: true,
            concurrency: params.concurrency,
        },
        remote,
    )?;

    Ok(PullOutcome {
        changes,
        landed_version: latest,
    })
}
