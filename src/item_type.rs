//! ItemTypeResolver (C2): decide a file's semantic val type from its
//! extension and name, or from prior remote state when available (§4.2).

use std::collections::HashMap;
use std::path::Path;

use crate::types::{ValItem, ValItemType};

const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];
const NAME_SUBSTRINGS: &[(&str, ValItemType)] = &[
    ("cron", ValItemType::Interval),
    ("http", ValItemType::Http),
    ("email", ValItemType::Email),
];

/// Resolve the semantic type for `path`. If `remote_snapshot` already has an
/// item at `path`, its type wins (a round trip is never needed just to
/// re-derive a type the remote already recorded).
pub fn resolve_type(path: &str, remote_snapshot: Option<&HashMap<String, ValItem>>) -> ValItemType {
    if let Some(snapshot) = remote_snapshot
        && let Some(item) = snapshot.get(path)
    {
        return item.item_type;
    }

    let Some(ext) = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
    else {
        return ValItemType::File;
    };

    if !SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
        return ValItemType::File;
    }

    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_ascii_lowercase();

    let matches: Vec<ValItemType> = NAME_SUBSTRINGS
        .iter()
        .filter(|(needle, _)| stem.contains(needle))
        .map(|(_, ty)| *ty)
        .collect();

    match matches.as_slice() {
        [only] => *only,
        // Zero or more than one match defaults to the most permissive type,
        // keeping the decision table stable for ambiguous/new files.
        _ => ValItemType::Script,
    }
}
