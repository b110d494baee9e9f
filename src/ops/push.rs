//! Push (C8): apply local -> remote changes with dependency-ordered
//! directory creation and bounded concurrency (§4.8).

use std::path::Path;

use rayon::prelude::*;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::remote::{CreateFileParams, DeleteFileParams, RemoteStore, UpdateFileParams};
use crate::status::{ItemStatus, ItemStatusManager, StatusEngineInput, status};
use crate::types::ValItemType;

/// Oversized-file cutoff used by the binary/size policy check in step 4.
/// Not named by the spec's data model; chosen to keep a single accidental
/// large-binary check from stalling an otherwise-good push.
const MAX_PUSHABLE_BYTES: usize = 10 * 1024 * 1024;

pub struct PushParams<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub branch_id: uuid::Uuid,
    pub ignore_rules: &'a IgnoreRules,
    pub dry_run: bool,
    pub concurrency: usize,
}

pub fn push(params: PushParams<'_>, remote: &dyn RemoteStore) -> Result<ItemStatusManager, EngineError> {
    let v0 = remote.latest_version(params.val_id, params.branch_id)?;

    let mut s = status(
        StatusEngineInput {
            target_dir: params.target_dir,
            val_id: params.val_id,
            branch_id: params.branch_id,
            version: v0,
            ignore_rules: params.ignore_rules,
        },
        remote,
    )?;
    s = crate::status::detect_renames(s, |path| std::fs::read(params.target_dir.join(path)).ok());

    if params.dry_run {
        return Ok(s);
    }

    annotate_warnings(&mut s, params.target_dir);

    let safe = s.filter(|entry| {
        matches!(
            entry,
            ItemStatus::Created { .. } | ItemStatus::Modified { .. } | ItemStatus::Renamed { .. }
        ) && entry.warnings().is_empty()
    });

    create_directories(&safe, &s, params.val_id, params.branch_id, remote)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.concurrency.max(1))
        .build()
        .map_err(|e| EngineError::programmer(e.to_string()))?;

    let file_ops: Vec<&ItemStatus> = safe
        .iter()
        .filter(|entry| !matches!(entry, ItemStatus::Created { item_type: ValItemType::Directory, .. }))
        .collect();

    let op_results: Vec<(String, Result<(), EngineError>)> = pool.install(|| {
        file_ops
            .par_iter()
            .map(|entry| {
                let path = entry.path().to_string();
                let result = apply_one(entry, params.target_dir, params.val_id, params.branch_id, remote);
                (path, result)
            })
            .collect()
    });

    for (path, result) in op_results {
        if let Err(e) = result {
            // Per §4.8 step 7: transport-level failures are annotated and
            // the batch continues; unexpected local errors abort.
            match e {
                EngineError::Transport { message } => {
                    s.update_warnings(&path, [format!("unknown: {message}")]);
                }
                other => return Err(other),
            }
        }
    }

    for deleted in s.deleted().map(|d| d.path().to_string()).collect::<Vec<_>>() {
        let result = remote.delete_file(
            params.val_id,
            DeleteFileParams {
                path: deleted.clone(),
                branch_id: params.branch_id,
                recursive: true,
            },
        );
        if let Err(EngineError::Transport { message }) = result {
            s.update_warnings(&deleted, [format!("unknown: {message}")]);
        } else {
            result?;
        }
    }

    Ok(s)
}

/// Per-file policy check (§4.8 step 4): reject binary files and files over
/// the size cutoff, annotating a warning instead of failing the batch.
fn annotate_warnings(manager: &mut ItemStatusManager, target_dir: &Path) {
    let candidates: Vec<String> = manager
        .iter()
        .filter(|e| matches!(e, ItemStatus::Created { .. } | ItemStatus::Modified { .. }))
        .map(|e| e.path().to_string())
        .collect();

    for path in candidates {
        let Ok(bytes) = std::fs::read(target_dir.join(&path)) else {
            continue;
        };

        if bytes.len() > MAX_PUSHABLE_BYTES {
            manager.update_warnings(&path, [format!("file exceeds {MAX_PUSHABLE_BYTES} bytes")]);
        } else if is_binary(&bytes) {
            manager.update_warnings(&path, ["binary content".to_string()]);
        }
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8000).any(|&b| b == 0)
}

/// Collects every directory path in `safe.created` plus every ancestor of
/// files in `safe.created` not already present remotely, sorted shallowest
/// first so a file never lands before its parent exists (§4.8 step 5).
fn create_directories(
    safe: &ItemStatusManager,
    full_status: &ItemStatusManager,
    val_id: uuid::Uuid,
    branch_id: uuid::Uuid,
    remote: &dyn RemoteStore,
) -> Result<(), EngineError> {
    let mut dirs: Vec<String> = Vec::new();

    for entry in safe.created() {
        if matches!(entry.item_type(), ValItemType::Directory) {
            dirs.push(entry.path().to_string());
        }
        for ancestor in ancestors_of(entry.path()) {
            if !dirs.contains(&ancestor) && !full_status.has(&ancestor) {
                dirs.push(ancestor);
            }
        }
    }

    dirs.sort_by_key(|d| d.matches('/').count());
    dirs.dedup();

    for dir in dirs {
        let result = remote.create_file(
            val_id,
            CreateFileParams {
                path: dir,
                item_type: ValItemType::Directory,
                branch_id,
                content: None,
            },
        );
        match result {
            Ok(_) => {}
            // "already exists" conflicts are expected when two ancestors
            // share a parent that another entry already created.
            Err(EngineError::Conflict { .. }) => {}
            Err(other) => return Err(other),
        }
    }

    Ok(())
}

fn ancestors_of(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path;
    while let Some(idx) = current.rfind('/') {
        current = &current[..idx];
        if !current.is_empty() {
            out.push(current.to_string());
        }
    }
    out
}

fn apply_one(
    entry: &ItemStatus,
    target_dir: &Path,
    val_id: uuid::Uuid,
    branch_id: uuid::Uuid,
    remote: &dyn RemoteStore,
) -> Result<(), EngineError> {
    match entry {
        ItemStatus::Renamed { path, old_path, item_type, .. } => {
            let content = std::fs::read(target_dir.join(path))?;
            let (parent, name) = split_parent_name(path);
            remote.update_file(
                val_id,
                old_path,
                branch_id,
                UpdateFileParams {
                    content: Some(content),
                    name: Some(name),
                    parent_path: Some(parent),
                    item_type: Some(*item_type),
                },
            )
        }
        ItemStatus::Created { path, item_type, .. } => {
            let content = if matches!(item_type, ValItemType::Directory) {
                None
            } else {
                Some(std::fs::read(target_dir.join(path))?)
            };
            remote
                .create_file(
                    val_id,
                    CreateFileParams {
                        path: path.clone(),
                        item_type: *item_type,
                        branch_id,
                        content,
                    },
                )
                .map(|_| ())
        }
        ItemStatus::Modified { path, .. } => {
            let content = std::fs::read(target_dir.join(path))?;
            remote.update_file(
                val_id,
                path,
                branch_id,
                UpdateFileParams {
                    content: Some(content),
                    ..Default::default()
                },
            )
        }
        ItemStatus::NotModified { .. } | ItemStatus::Deleted { .. } => Ok(()),
    }
}

fn split_parent_name(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_of_nested_path_lists_every_parent() {
        let ancestors = ancestors_of("a/b/c.ts");
        assert_eq!(ancestors, vec!["a/b".to_string(), "a".to_string()]);
    }

    #[test]
    fn ancestors_of_root_path_is_empty() {
        assert!(ancestors_of("a.ts").is_empty());
    }

    #[test]
    fn is_binary_detects_null_byte() {
        assert!(is_binary(&[0, 1, 2, 0, 3]));
    }

    #[test]
    fn is_binary_false_for_text() {
        assert!(!is_binary(b"hello world"));
    }

    #[test]
    fn split_parent_name_handles_nested_path() {
        assert_eq!(split_parent_name("api/hello.ts"), ("api".to_string(), "hello.ts".to_string()));
    }

    #[test]
    fn split_parent_name_handles_root_path() {
        assert_eq!(split_parent_name("readme.md"), (String::new(), "readme.md".to_string()));
    }
}
