//! ItemStatusManager (C3): an in-memory tagged-set of per-path status
//! entries with insert/merge/filter/remove (§3.1, §4.3).

mod engine;
mod rename;

pub use engine::{StatusEngineInput, status};
pub use rename::detect_renames;

use indexmap::IndexMap;

use crate::error::EngineError;
use crate::types::ValItemType;

/// Which side holds the newer content for a `Modified` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifiedWhere {
    Local,
    Remote,
}

/// A tagged union over the five possible per-path states (§3.1).
#[derive(Clone, Debug)]
pub enum ItemStatus {
    Modified {
        path: String,
        item_type: ValItemType,
        content: Option<Vec<u8>>,
        location: ModifiedWhere,
        warnings: Vec<String>,
    },
    NotModified {
        path: String,
        item_type: ValItemType,
        content: Option<Vec<u8>>,
    },
    Deleted {
        path: String,
        item_type: ValItemType,
    },
    Created {
        path: String,
        item_type: ValItemType,
        mtime: std::time::SystemTime,
        content: Option<Vec<u8>>,
        warnings: Vec<String>,
    },
    Renamed {
        path: String,
        old_path: String,
        item_type: ValItemType,
        similarity: f64,
        warnings: Vec<String>,
    },
}

impl ItemStatus {
    pub fn path(&self) -> &str {
        match self {
            ItemStatus::Modified { path, .. }
            | ItemStatus::NotModified { path, .. }
            | ItemStatus::Deleted { path, .. }
            | ItemStatus::Created { path, .. }
            | ItemStatus::Renamed { path, .. } => path,
        }
    }

    pub fn item_type(&self) -> ValItemType {
        match self {
            ItemStatus::Modified { item_type, .. }
            | ItemStatus::NotModified { item_type, .. }
            | ItemStatus::Deleted { item_type, .. }
            | ItemStatus::Created { item_type, .. }
            | ItemStatus::Renamed { item_type, .. } => *item_type,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ItemStatus::Modified { warnings, .. }
            | ItemStatus::Created { warnings, .. }
            | ItemStatus::Renamed { warnings, .. } => warnings,
            ItemStatus::NotModified { .. } | ItemStatus::Deleted { .. } => &[],
        }
    }

    fn bucket(&self) -> Bucket {
        match self {
            ItemStatus::Modified { .. } => Bucket::Modified,
            ItemStatus::NotModified { .. } => Bucket::NotModified,
            ItemStatus::Deleted { .. } => Bucket::Deleted,
            ItemStatus::Created { .. } => Bucket::Created,
            ItemStatus::Renamed { .. } => Bucket::Renamed,
        }
    }

    fn into_modified(self, location: ModifiedWhere) -> ItemStatus {
        let path = self.path().to_string();
        let item_type = self.item_type();
        ItemStatus::Modified {
            path,
            item_type,
            content: None,
            location,
            warnings: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Bucket {
    Modified,
    NotModified,
    Deleted,
    Created,
    Renamed,
}

impl Bucket {
    const ALL: [Bucket; 5] = [
        Bucket::Modified,
        Bucket::NotModified,
        Bucket::Deleted,
        Bucket::Created,
        Bucket::Renamed,
    ];

    fn label(self) -> &'static str {
        match self {
            Bucket::Modified => "modified",
            Bucket::NotModified => "not_modified",
            Bucket::Deleted => "deleted",
            Bucket::Created => "created",
            Bucket::Renamed => "renamed",
        }
    }
}

/// A logical mapping `path -> ItemStatus`, partitioned into five buckets —
/// one per `ItemStatus` variant — so that callers filtering by kind (e.g.
/// Push's `safe` set) never need to match on the whole enum.
#[derive(Clone, Debug, Default)]
pub struct ItemStatusManager {
    buckets: [IndexMap<String, ItemStatus>; 5],
}

impl ItemStatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_index(bucket: Bucket) -> usize {
        Bucket::ALL.iter().position(|b| *b == bucket).unwrap()
    }

    fn bucket_map(&self, bucket: Bucket) -> &IndexMap<String, ItemStatus> {
        &self.buckets[Self::bucket_index(bucket)]
    }

    fn bucket_map_mut(&mut self, bucket: Bucket) -> &mut IndexMap<String, ItemStatus> {
        &mut self.buckets[Self::bucket_index(bucket)]
    }

    /// Places `status` in its bucket, applying the transition rules (§4.3)
    /// first. Inserting an entry with an empty path is a programmer error
    /// (I2) and fails synchronously.
    pub fn insert(&mut self, status: ItemStatus) -> Result<(), EngineError> {
        let path = status.path().to_string();
        if path.is_empty() {
            return Err(EngineError::programmer(
                "ItemStatusManager::insert called with an empty path",
            ));
        }

        let prior_bucket = Bucket::ALL.into_iter().find(|b| self.bucket_map(*b).contains_key(&path));

        let status = match (status.bucket(), prior_bucket) {
            // I4: Created on a path currently Deleted collapses to Modified.
            (Bucket::Created, Some(Bucket::Deleted)) => status.into_modified(ModifiedWhere::Local),
            // I4: Deleted on a path currently Created collapses to Modified.
            (Bucket::Deleted, Some(Bucket::Created)) => status.into_modified(ModifiedWhere::Remote),
            _ => status,
        };

        // I1: a path lives in at most one bucket — evict wherever it was
        // before placing it in its (possibly collapsed) new bucket.
        self.remove(&path);
        self.place(status);
        Ok(())
    }

    fn place(&mut self, status: ItemStatus) {
        let bucket = status.bucket();
        let path = status.path().to_string();
        self.bucket_map_mut(bucket).insert(path, status);
    }

    /// Removes `path` from whichever bucket contains it.
    pub fn remove(&mut self, path: &str) -> bool {
        for bucket in Bucket::ALL {
            if self.bucket_map_mut(bucket).shift_remove(path).is_some() {
                return true;
            }
        }
        false
    }

    pub fn has(&self, path: &str) -> bool {
        Bucket::ALL.iter().any(|b| self.bucket_map(*b).contains_key(path))
    }

    pub fn get(&self, path: &str) -> Option<&ItemStatus> {
        Bucket::ALL.iter().find_map(|b| self.bucket_map(*b).get(path))
    }

    /// Merges `warnings` into the entry at `path`, if present, preserving
    /// its bucket and other fields.
    pub fn update_warnings(&mut self, path: &str, extra: impl IntoIterator<Item = String>) {
        for bucket in Bucket::ALL {
            if let Some(entry) = self.bucket_map_mut(bucket).get_mut(path) {
                match entry {
                    ItemStatus::Modified { warnings, .. }
                    | ItemStatus::Created { warnings, .. }
                    | ItemStatus::Renamed { warnings, .. } => warnings.extend(extra),
                    ItemStatus::NotModified { .. } | ItemStatus::Deleted { .. } => {}
                }
                return;
            }
        }
    }

    pub fn size(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket_map(*b).len()).sum()
    }

    /// `changes() = size - not_modified.size` (I5).
    pub fn changes(&self) -> usize {
        self.size() - self.bucket_map(Bucket::NotModified).len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Right-overriding union: for every path present in `other`, remove it
    /// from `self` first, then insert from `other`.
    pub fn merge(mut self, other: ItemStatusManager) -> ItemStatusManager {
        for bucket in Bucket::ALL {
            for (path, _) in other.bucket_map(bucket).iter() {
                self.remove(path);
            }
        }
        for bucket in Bucket::ALL {
            for (_, status) in other.buckets[Self::bucket_index(bucket)].into_iter() {
                // Transition rules apply again on merge-insert, matching
                // plain insert semantics; errors are impossible here since
                // paths were already validated on their origin manager.
                let _ = self.insert(status);
            }
        }
        self
    }

    /// Returns a new manager containing only entries satisfying `predicate`.
    pub fn filter(&self, mut predicate: impl FnMut(&ItemStatus) -> bool) -> ItemStatusManager {
        let mut out = ItemStatusManager::new();
        for bucket in Bucket::ALL {
            for status in self.bucket_map(bucket).values() {
                if predicate(status) {
                    out.place(status.clone());
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStatus> {
        Bucket::ALL.into_iter().flat_map(move |b| self.bucket_map(b).values())
    }

    pub fn created(&self) -> impl Iterator<Item = &ItemStatus> {
        self.bucket_map(Bucket::Created).values()
    }

    pub fn deleted(&self) -> impl Iterator<Item = &ItemStatus> {
        self.bucket_map(Bucket::Deleted).values()
    }

    pub fn modified(&self) -> impl Iterator<Item = &ItemStatus> {
        self.bucket_map(Bucket::Modified).values()
    }

    pub fn renamed(&self) -> impl Iterator<Item = &ItemStatus> {
        self.bucket_map(Bucket::Renamed).values()
    }

    pub fn not_modified(&self) -> impl Iterator<Item = &ItemStatus> {
        self.bucket_map(Bucket::NotModified).values()
    }

    /// Buckets-with-lists snapshot; when `sorted` is true, paths within
    /// each bucket sort lexicographically, otherwise insertion order.
    pub fn entries(&self, sorted: bool) -> Vec<(&'static str, Vec<String>)> {
        Bucket::ALL
            .into_iter()
            .map(|bucket| {
                let mut paths: Vec<String> = self.bucket_map(bucket).keys().cloned().collect();
                if sorted {
                    paths.sort();
                }
                (bucket.label(), paths)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(path: &str) -> ItemStatus {
        ItemStatus::Created {
            path: path.to_string(),
            item_type: ValItemType::File,
            mtime: std::time::SystemTime::now(),
            content: None,
            warnings: Vec::new(),
        }
    }

    fn deleted(path: &str) -> ItemStatus {
        ItemStatus::Deleted {
            path: path.to_string(),
            item_type: ValItemType::File,
        }
    }

    fn not_modified(path: &str) -> ItemStatus {
        ItemStatus::NotModified {
            path: path.to_string(),
            item_type: ValItemType::File,
            content: None,
        }
    }

    fn modified(path: &str, location: ModifiedWhere) -> ItemStatus {
        ItemStatus::Modified {
            path: path.to_string(),
            item_type: ValItemType::File,
            content: None,
            location,
            warnings: Vec::new(),
        }
    }

    // P1: buckets disjoint.
    #[test]
    fn path_appears_in_at_most_one_bucket() {
        let mut m = ItemStatusManager::new();
        m.insert(not_modified("a.ts")).unwrap();
        m.insert(modified("a.ts", ModifiedWhere::Local)).unwrap();
        assert_eq!(
            Bucket::ALL
                .iter()
                .filter(|b| m.bucket_map(**b).contains_key("a.ts"))
                .count(),
            1
        );
    }

    // P2: create/delete collapse.
    #[test]
    fn create_then_delete_collapses_to_modified() {
        let mut m = ItemStatusManager::new();
        m.insert(created("a.ts")).unwrap();
        m.insert(deleted("a.ts")).unwrap();
        assert!(m.has("a.ts"));
        assert!(matches!(m.get("a.ts"), Some(ItemStatus::Modified { .. })));
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn delete_then_create_collapses_to_modified() {
        let mut m = ItemStatusManager::new();
        m.insert(deleted("a.ts")).unwrap();
        m.insert(created("a.ts")).unwrap();
        assert!(matches!(m.get("a.ts"), Some(ItemStatus::Modified { .. })));
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn rename_on_created_path_drops_created_entry() {
        let mut m = ItemStatusManager::new();
        m.insert(created("new.ts")).unwrap();
        m.insert(ItemStatus::Renamed {
            path: "new.ts".to_string(),
            old_path: "old.ts".to_string(),
            item_type: ValItemType::File,
            similarity: 1.0,
            warnings: Vec::new(),
        })
        .unwrap();
        assert_eq!(m.size(), 1);
        assert!(matches!(m.get("new.ts"), Some(ItemStatus::Renamed { .. })));
    }

    #[test]
    fn insert_empty_path_is_programmer_error() {
        let mut m = ItemStatusManager::new();
        let err = m.insert(not_modified("")).unwrap_err();
        assert!(matches!(err, EngineError::ProgrammerError { .. }));
    }

    // P3: merge idempotence on disjoint paths.
    #[test]
    fn merge_on_disjoint_paths_sums_sizes() {
        let mut a = ItemStatusManager::new();
        a.insert(created("a.ts")).unwrap();
        let mut b = ItemStatusManager::new();
        b.insert(created("b.ts")).unwrap();

        let merged = a.merge(b);
        assert_eq!(merged.size(), 2);
    }

    // P4: merge right-overrides.
    #[test]
    fn merge_prefers_other_on_overlapping_path() {
        let mut a = ItemStatusManager::new();
        a.insert(not_modified("a.ts")).unwrap();
        let mut b = ItemStatusManager::new();
        b.insert(modified("a.ts", ModifiedWhere::Remote)).unwrap();

        let merged = a.merge(b);
        assert_eq!(merged.size(), 1);
        assert!(matches!(
            merged.get("a.ts"),
            Some(ItemStatus::Modified {
                location: ModifiedWhere::Remote,
                ..
            })
        ));
    }

    // I5.
    #[test]
    fn changes_excludes_not_modified() {
        let mut m = ItemStatusManager::new();
        m.insert(not_modified("a.ts")).unwrap();
        m.insert(created("b.ts")).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.changes(), 1);
    }

    #[test]
    fn filter_keeps_only_matching_entries() {
        let mut m = ItemStatusManager::new();
        m.insert(created("a.ts")).unwrap();
        m.insert(not_modified("b.ts")).unwrap();

        let only_created = m.filter(|s| matches!(s, ItemStatus::Created { .. }));
        assert_eq!(only_created.size(), 1);
        assert!(only_created.has("a.ts"));
    }

    #[test]
    fn entries_sorted_orders_paths_lexicographically() {
        let mut m = ItemStatusManager::new();
        m.insert(created("z.ts")).unwrap();
        m.insert(created("a.ts")).unwrap();

        let entries = m.entries(true);
        let created_bucket = entries.iter().find(|(name, _)| *name == "created").unwrap();
        assert_eq!(created_bucket.1, vec!["a.ts".to_string(), "z.ts".to_string()]);
    }

    #[test]
    fn remove_reports_whether_path_was_present() {
        let mut m = ItemStatusManager::new();
        m.insert(created("a.ts")).unwrap();
        assert!(m.remove("a.ts"));
        assert!(!m.remove("a.ts"));
    }
}
