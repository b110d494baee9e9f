//! Shared plumbing for command handlers: concurrency/ignore-rule resolution
//! and diff rendering, factored out so each handler reads as "load state,
//! call one `ops::*` function, print the result".

use std::path::Path;

use crate::config::Config;
use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::meta::MetaStore;
use crate::status::ItemStatusManager;
use crate::styling::{format_status_line, println};

/// Suggested bounded-concurrency default (§4.6: "suggested 5-10") absent a
/// `--concurrency` flag or config value.
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_GRACE_MS: u64 = 500;

pub fn resolve_concurrency(cli_value: Option<usize>, config: &Config) -> usize {
    cli_value.or(config.concurrency).unwrap_or(DEFAULT_CONCURRENCY).max(1)
}

pub fn build_ignore_rules(root: &Path, config: &Config, meta: &MetaStore) -> Result<IgnoreRules, EngineError> {
    let local_path = meta.local_ignore_file();
    let local = local_path.is_file().then_some(local_path.as_path());
    IgnoreRules::build(root, &config.global_ignore_files, local).map_err(|e| EngineError::programmer(e.to_string()))
}

/// The working copy root: `cwd`, since every command operates on the
/// directory it was invoked from (§6.2).
pub fn working_copy_root() -> Result<std::path::PathBuf, EngineError> {
    Ok(std::env::current_dir()?)
}

/// Prints every changed entry (everything but `not_modified`), matching the
/// `status`/`pull`/`push` diff rendering the spec calls `displayFileStateChanges`.
pub fn print_changes(changes: &ItemStatusManager) {
    for (bucket, paths) in changes.entries(true) {
        if bucket == "not_modified" {
            continue;
        }
        for path in paths {
            let detail = match changes.get(&path) {
                Some(crate::status::ItemStatus::Renamed { old_path, similarity, .. }) => {
                    Some(format!("from {old_path}, {:.0}%", similarity * 100.0))
                }
                _ => None,
            };
            println!("{}", format_status_line(bucket, &path, detail.as_deref()));
        }
    }
    if changes.changes() == 0 {
        println!("no changes");
    }
}
