//! Rename detection pass (§4.5 step 5): pairs up `Created`/`Deleted`
//! entries of the same type whose contents are similar enough, emitting
//! `Renamed` entries and dropping the paired halves.

use similar::TextDiff;

use super::{ItemStatus, ItemStatusManager};

/// Similarity threshold pinned per the open question in spec §9.3: normalized
/// edit-based similarity, computed as `TextDiff::ratio()` over line-based
/// diffing of the (lossily-decoded) byte content.
pub const RENAME_SIMILARITY_THRESHOLD: f64 = 0.5;

struct Candidate {
    old_path: String,
    new_path: String,
    similarity: f64,
}

/// Runs the optional rename-detection pass over `manager`'s `Created` and
/// `Deleted` buckets. `content_of` resolves the bytes for a given path in
/// either bucket (local disk read for `Created`, a remote fetch for
/// `Deleted`) so the pass can be pure over already-materialized content.
///
/// Idempotent: if no pair reaches the threshold, the manager comes back
/// unchanged (P9 is enforced by only ever pairing same-typed entries).
pub fn detect_renames(
    manager: ItemStatusManager,
    content_of: impl Fn(&str) -> Option<Vec<u8>>,
) -> ItemStatusManager {
    let created: Vec<&ItemStatus> = manager.created().collect();
    let deleted: Vec<&ItemStatus> = manager.deleted().collect();

    if created.is_empty() || deleted.is_empty() {
        return manager;
    }

    let mut candidates = Vec::new();
    for c in &created {
        let ItemStatus::Created { path: new_path, item_type: c_type, .. } = c else {
            continue;
        };
        let Some(new_content) = content_of(new_path) else {
            continue;
        };
        let new_text = String::from_utf8_lossy(&new_content);

        for d in &deleted {
            let ItemStatus::Deleted { path: old_path, item_type: d_type } = d else {
                continue;
            };
            // P9: never pair entries whose types differ.
            if c_type != d_type {
                continue;
            }
            let Some(old_content) = content_of(old_path) else {
                continue;
            };
            let old_text = String::from_utf8_lossy(&old_content);

            let similarity = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref()).ratio() as f64;
            if similarity >= RENAME_SIMILARITY_THRESHOLD {
                candidates.push(Candidate {
                    old_path: old_path.clone(),
                    new_path: new_path.clone(),
                    similarity,
                });
            }
        }
    }

    // Tie-break by highest similarity, then lexicographic old_path, and
    // greedily pair so each path is used at most once.
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.old_path.cmp(&b.old_path))
    });

    let mut used_old = std::collections::HashSet::new();
    let mut used_new = std::collections::HashSet::new();
    let mut result = manager;

    for candidate in candidates {
        if used_old.contains(&candidate.old_path) || used_new.contains(&candidate.new_path) {
            continue;
        }
        let item_type = result
            .get(&candidate.new_path)
            .map(ItemStatus::item_type)
            .expect("candidate new_path came from an existing Created entry");

        used_old.insert(candidate.old_path.clone());
        used_new.insert(candidate.new_path.clone());

        let _ = result.insert(ItemStatus::Renamed {
            path: candidate.new_path,
            old_path: candidate.old_path,
            item_type,
            similarity: candidate.similarity,
            warnings: Vec::new(),
        });
    }

    result
}
