//! Checkout (C9): switch the working copy between branches, preserving
//! untracked files (§4.9). Dirty-state gating is the orchestrator's job,
//! not this function's — see `dangerous_changes` below.

use std::path::Path;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::ops::pull::{PullParams, pull};
use crate::remote::{CreateBranchParams, ListFilesParams, RemoteStore};
use crate::stage::do_atomically;
use crate::status::{ItemStatus, ItemStatusManager, ModifiedWhere};
use crate::types::{BranchMeta, FIRST_VERSION_NUMBER};

pub enum CheckoutShape {
    /// Switch to an existing branch.
    Branch {
        to_branch_id: uuid::Uuid,
        to_branch_version: Option<u64>,
    },
    /// Fork `forked_from_id` into a new branch named `name`, then check it
    /// out at `FIRST_VERSION_NUMBER`.
    Fork { forked_from_id: uuid::Uuid, name: String },
}

pub struct CheckoutParams<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub from_branch_id: uuid::Uuid,
    pub shape: CheckoutShape,
    pub dry_run: bool,
    pub ignore_rules: &'a IgnoreRules,
    pub concurrency: usize,
}

pub struct CheckoutOutcome {
    pub from_branch: BranchMeta,
    pub to_branch: Option<BranchMeta>,
    pub changes: ItemStatusManager,
}

pub fn checkout(params: CheckoutParams<'_>, remote: &dyn RemoteStore) -> Result<CheckoutOutcome, EngineError> {
    let from_branch = remote.retrieve_branch(params.val_id, params.from_branch_id)?;

    let from_files = list_paths(remote, params.val_id, from_branch.id, from_branch.version)?;

    let (to_branch, to_branch_version) = match &params.shape {
        CheckoutShape::Branch {
            to_branch_id,
            to_branch_version,
        } => {
            let branch = remote.retrieve_branch(params.val_id, *to_branch_id)?;
            let version = to_branch_version.unwrap_or(branch.version);
            (Some(branch), version)
        }
        CheckoutShape::Fork { forked_from_id, name } => {
            if params.dry_run {
                (None, FIRST_VERSION_NUMBER)
            } else {
                let branch = remote.create_branch(
                    params.val_id,
                    CreateBranchParams {
                        name: name.clone(),
                        branch_id: Some(*forked_from_id),
                    },
                )?;
                (Some(branch), FIRST_VERSION_NUMBER)
            }
        }
    };

    let to_files = match &to_branch {
        Some(b) => list_paths(remote, params.val_id, b.id, to_branch_version)?,
        None => Vec::new(),
    };

    let result = do_atomically(params.target_dir, "valsync-checkout", |scratch| {
        // Step 1: copy target_dir -> scratch preserving timestamps, so the
        // subsequent Pull sees accurate deltas.
        copy_tree_preserving_mtime(params.target_dir, scratch)?;

        let mut changes = ItemStatusManager::new();

        if let Some(to_branch) = &to_branch {
            let pull_outcome = pull(
                PullParams {
                    target_dir: scratch,
                    val_id: params.val_id,
                    branch_id: to_branch.id,
                    version: Some(to_branch_version),
                    ignore_rules: params.ignore_rules,
                    dry_run: false,
                    concurrency: params.concurrency,
                },
                remote,
            )?;
            changes = changes.merge(pull_outcome.changes);
        }

        // Step 5: paths present at `from` but absent at `to` are deleted,
        // unless they are untracked (not in `from_files` either) — those
        // are preserved unconditionally (step 6 / P7).
        for path in walk_relative(params.target_dir, params.ignore_rules)? {
            let in_from = from_files.contains(&path);
            let in_to = to_files.contains(&path);
            if in_from && !in_to {
                let item_type = status_item_type(&changes, &path);
                let _ = changes.insert(ItemStatus::Deleted { path: path.clone(), item_type });
                if !params.dry_run {
                    let abs = scratch.join(&path);
                    let _ = std::fs::remove_file(&abs).or_else(|_| std::fs::remove_dir_all(&abs));
                }
            }
        }

        Ok((changes, !params.dry_run))
    })?;

    Ok(CheckoutOutcome {
        from_branch,
        to_branch,
        changes: result,
    })
}

fn status_item_type(changes: &ItemStatusManager, path: &str) -> crate::types::ValItemType {
    changes
        .get(path)
        .map(ItemStatus::item_type)
        .unwrap_or(crate::types::ValItemType::File)
}

fn list_paths(
    remote: &dyn RemoteStore,
    val_id: uuid::Uuid,
    branch_id: uuid::Uuid,
    version: u64,
) -> Result<Vec<String>, EngineError> {
    Ok(remote
        .list_files(
            val_id,
            ListFilesParams {
                branch_id,
                version,
                path: None,
                recursive: true,
            },
        )?
        .into_iter()
        .map(|item| item.path)
        .collect())
}

fn walk_relative(root: &Path, ignore_rules: &IgnoreRules) -> Result<Vec<String>, EngineError> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(read_dir) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in read_dir {
            let entry = entry?;
            let is_dir = entry.file_type()?.is_dir();
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            if ignore_rules.is_ignored(&relative, is_dir) {
                continue;
            }
            if is_dir {
                stack.push(entry.path());
            } else {
                out.push(crate::path::to_item_path(&relative));
            }
        }
    }
    Ok(out)
}

fn copy_tree_preserving_mtime(from: &Path, to: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(to)?;
    let mut stack = vec![from.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let relative = entry.path().strip_prefix(from).unwrap().to_path_buf();
            let dest = to.join(&relative);
            if entry.file_type()?.is_dir() {
                std::fs::create_dir_all(&dest)?;
                stack.push(entry.path());
            } else {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                reflink_copy::reflink_or_copy(entry.path(), &dest)?;
                let metadata = entry.metadata()?;
                let mtime = filetime::FileTime::from_last_modification_time(&metadata);
                filetime::set_file_mtime(&dest, mtime).ok();
            }
        }
    }
    Ok(())
}

/// Computes the "dangerous set" the orchestrator must gate a non-forced,
/// non-dry-run existing-branch checkout on (§4.9): locally `Modified` or
/// `Deleted` entries, overridden to `NotModified` where the remote-side
/// status shows the same path already `Modified{where=remote}` (landing
/// will pick up the remote version and lose no local state).
pub fn dangerous_changes(local_status: &ItemStatusManager) -> ItemStatusManager {
    local_status.filter(|entry| match entry {
        ItemStatus::Modified { location, .. } => *location != ModifiedWhere::Remote,
        ItemStatus::Deleted { .. } => true,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValItemType;

    fn modified(path: &str, location: ModifiedWhere) -> ItemStatus {
        ItemStatus::Modified {
            path: path.to_string(),
            item_type: ValItemType::File,
            content: None,
            location,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn dangerous_changes_excludes_remote_dominated_modifications() {
        let mut m = ItemStatusManager::new();
        m.insert(modified("a.ts", ModifiedWhere::Local)).unwrap();
        m.insert(modified("b.ts", ModifiedWhere::Remote)).unwrap();

        let dangerous = dangerous_changes(&m);
        assert!(dangerous.has("a.ts"));
        assert!(!dangerous.has("b.ts"));
    }

    #[test]
    fn dangerous_changes_includes_local_deletions() {
        let mut m = ItemStatusManager::new();
        m.insert(ItemStatus::Deleted {
            path: "gone.ts".to_string(),
            item_type: ValItemType::File,
        })
        .unwrap();

        assert!(dangerous_changes(&m).has("gone.ts"));
    }
}
