//! Core data model shared across the engine (§3).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The first version number a branch is created at (§3.1).
pub const FIRST_VERSION_NUMBER: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
    Unlisted,
}

impl Default for Privacy {
    fn default() -> Self {
        Privacy::Private
    }
}

/// A remote namespaced artifact identified by a stable id (§3.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValMeta {
    pub id: Uuid,
    pub name: String,
    pub author: String,
    pub privacy: Privacy,
    pub description: Option<String>,
}

/// A linear version line inside a val.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BranchMeta {
    pub id: Uuid,
    pub name: String,
    pub version: u64,
}

/// The semantic type assigned to a val item. Ordering matters only for
/// display; it is not used for sorting remote listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValItemType {
    File,
    Http,
    Interval,
    Email,
    Script,
    Directory,
}

impl std::fmt::Display for ValItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValItemType::File => "file",
            ValItemType::Http => "http",
            ValItemType::Interval => "interval",
            ValItemType::Email => "email",
            ValItemType::Script => "script",
            ValItemType::Directory => "directory",
        };
        write!(f, "{s}")
    }
}

/// A node in the remote tree (§3.1). `path` is `/`-separated, relative to
/// the val root, never empty for non-root nodes, and has no leading `/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValItem {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ValItemType,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ValItem {
    pub fn is_directory(&self) -> bool {
        self.item_type == ValItemType::Directory
    }
}

/// A node on disk under the working-copy root.
#[derive(Clone, Debug)]
pub struct LocalItem {
    pub path: String,
    pub is_directory: bool,
    pub mtime: std::time::SystemTime,
}

/// Persisted working-copy state (§3.1, §6.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkingCopyState {
    pub val: ValRef,
    pub branch: BranchRef,
    #[serde(rename = "lastRun", skip_serializing_if = "Option::is_none")]
    pub last_run: Option<LastRun>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValRef {
    pub id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BranchRef {
    pub id: Uuid,
    pub version: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LastRun {
    pub pid: i64,
}
