//! StatusEngine (C5): produces an `ItemStatusManager` diff between a local
//! directory tree and a remote snapshot at a given version (§4.5).

use std::collections::HashMap;
use std::path::Path;

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::item_type;
use crate::remote::{GetContentParams, ListFilesParams, RemoteStore};
use crate::status::{ItemStatus, ItemStatusManager, ModifiedWhere};
use crate::types::{LocalItem, ValItem, ValItemType};

pub struct StatusEngineInput<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub branch_id: uuid::Uuid,
    pub version: u64,
    pub ignore_rules: &'a IgnoreRules,
}

/// Enumerates `local` by walking `target_dir` (skipping ignored paths) and
/// `remote` by listing the val at `(branch_id, version)`, then diffs them
/// per §4.5 steps 3-4. Does not run the optional rename-detection pass;
/// callers that want renames call `super::detect_renames` on the result.
pub fn status(
    input: StatusEngineInput<'_>,
    remote: &dyn RemoteStore,
) -> Result<ItemStatusManager, EngineError> {
    let local = enumerate_local(input.target_dir, input.ignore_rules)?;
    let remote_items = remote.list_files(
        input.val_id,
        ListFilesParams {
            branch_id: input.branch_id,
            version: input.version,
            path: None,
            recursive: true,
        },
    )?;

    let remote_by_path: HashMap<String, ValItem> = remote_items
        .into_iter()
        .filter(|item| !input.ignore_rules.is_ignored(Path::new(&item.path), item.is_directory()))
        .map(|item| (item.path.clone(), item))
        .collect();

    let mut manager = ItemStatusManager::new();

    for (path, local_item) in &local {
        match remote_by_path.get(path) {
            None => {
                let item_type = item_type::resolve_type(path, Some(&remote_by_path));
                manager.insert(ItemStatus::Created {
                    path: path.clone(),
                    item_type,
                    mtime: local_item.mtime,
                    content: None,
                    warnings: Vec::new(),
                })?;
            }
            Some(_) if local_item.is_directory => {
                manager.insert(ItemStatus::NotModified {
                    path: path.clone(),
                    item_type: ValItemType::Directory,
                    content: None,
                })?;
            }
            Some(remote_item) => {
                let status = diff_file(
                    input.target_dir,
                    path,
                    local_item,
                    remote_item,
                    input.val_id,
                    input.branch_id,
                    input.version,
                    remote,
                )?;
                manager.insert(status)?;
            }
        }
    }

    for (path, remote_item) in &remote_by_path {
        if !local.contains_key(path) {
            manager.insert(ItemStatus::Deleted {
                path: path.clone(),
                item_type: remote_item.item_type,
            })?;
        }
    }

    Ok(manager)
}

/// mtime-first-then-content compare for a single non-directory path that
/// exists on both sides. The full byte comparison is O(size) and needs a
/// remote round trip, so it is only reached when mtimes disagree — equal
/// mtimes are the overwhelmingly common case for a freshly pulled tree.
#[allow(clippy::too_many_arguments)]
fn diff_file(
    target_dir: &Path,
    path: &str,
    local_item: &LocalItem,
    remote_item: &ValItem,
    val_id: uuid::Uuid,
    branch_id: uuid::Uuid,
    version: u64,
    remote: &dyn RemoteStore,
) -> Result<ItemStatus, EngineError> {
    let local_mtime = local_item.mtime;
    let remote_mtime: std::time::SystemTime = remote_item.updated_at.into();

    if local_mtime == remote_mtime {
        return Ok(ItemStatus::NotModified {
            path: path.to_string(),
            item_type: remote_item.item_type,
            content: None,
        });
    }

    let local_bytes = std::fs::read(target_dir.join(path))?;
    let remote_bytes = remote.get_content(
        val_id,
        GetContentParams {
            path: path.to_string(),
            branch_id,
            version,
        },
    )?;

    if local_bytes == remote_bytes {
        return Ok(ItemStatus::NotModified {
            path: path.to_string(),
            item_type: remote_item.item_type,
            content: None,
        });
    }

    let location = if remote_mtime > local_mtime {
        ModifiedWhere::Remote
    } else {
        ModifiedWhere::Local
    };

    Ok(ItemStatus::Modified {
        path: path.to_string(),
        item_type: remote_item.item_type,
        content: None,
        location,
        warnings: Vec::new(),
    })
}

/// Walks `target_dir`, recording whether each entry is a directory, and
/// skipping any path `is_ignored` denies. Contents are not read here.
fn enumerate_local(
    target_dir: &Path,
    ignore_rules: &IgnoreRules,
) -> Result<HashMap<String, LocalItem>, EngineError> {
    let mut out = HashMap::new();
    let mut stack = vec![target_dir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        for entry in read_dir {
            let entry = entry?;
            let abs_path = entry.path();
            let relative = abs_path
                .strip_prefix(target_dir)
                .expect("walked entry is under target_dir");
            let is_dir = entry.file_type()?.is_dir();

            if ignore_rules.is_ignored(relative, is_dir) {
                continue;
            }

            let metadata = entry.metadata()?;
            let rel_str = crate::path::to_item_path(relative);

            out.insert(
                rel_str.clone(),
                LocalItem {
                    path: rel_str,
                    is_directory: is_dir,
                    mtime: metadata.modified()?,
                },
            );

            if is_dir {
                stack.push(abs_path);
            }
        }
    }

    Ok(out)
}
