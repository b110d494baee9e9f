//! AtomicStager (C4): run an operation in a scratch directory and optionally
//! copy-back to the target on success (§4.4). Every mutating local operation
//! (clone, pull, checkout) goes through this so a failed partial apply never
//! leaves the working copy half-written (P8).

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::EngineError;

/// Runs `op` inside a fresh scratch directory distinct from `target_dir`.
/// On success with `commit = true`, copy-merges the scratch onto
/// `target_dir` (overwrite, preserve timestamps, create missing
/// directories) before returning `op`'s value. On any error, or when `op`
/// returns `commit = false`, the scratch is discarded and `target_dir` is
/// left untouched.
pub fn do_atomically<T>(
    target_dir: &Path,
    prefix: &str,
    op: impl FnOnce(&Path) -> Result<(T, bool), EngineError>,
) -> Result<T, EngineError> {
    let parent = std::env::temp_dir();
    let scratch = TempDir::with_prefix_in(prefix, &parent).map_err(EngineError::from)?;

    let result = op(scratch.path());

    let (value, commit) = match result {
        Ok(ok) => ok,
        Err(e) => {
            // `scratch` drops here, removing the directory tree.
            return Err(e);
        }
    };

    if commit {
        copy_merge(scratch.path(), target_dir)?;
    }

    Ok(value)
}

/// Copy-merges `from` onto `to`: every file and directory in `from` is
/// created (if absent) or overwritten (if present) under `to`, preserving
/// `from`'s mtimes. Paths present only in `to` are left alone — this is a
/// merge, not a mirror.
fn copy_merge(from: &Path, to: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(to)?;

    for entry in walk_files(from)? {
        let relative = entry.strip_prefix(from).expect("walked entry is under `from`");
        let dest = to.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest)?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // reflink-copy falls back to a regular copy when the filesystem
        // doesn't support reflinks, and always preserves file content;
        // timestamps are restored explicitly below since not every
        // backend preserves mtime on copy.
        reflink_copy::reflink_or_copy(&entry, &dest)?;

        let metadata = std::fs::metadata(&entry)?;
        let mtime = filetime::FileTime::from_last_modification_time(&metadata);
        filetime::set_file_mtime(&dest, mtime).ok();
    }

    Ok(())
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                out.push(path.clone());
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_copies_scratch_contents_into_target() {
        let target = tempfile::tempdir().unwrap();

        let result = do_atomically(target.path(), "valsync-test", |scratch| {
            std::fs::write(scratch.join("a.txt"), b"hello").unwrap();
            Ok((42, true))
        })
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(std::fs::read(target.path().join("a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn dry_run_does_not_commit() {
        let target = tempfile::tempdir().unwrap();

        do_atomically(target.path(), "valsync-test", |scratch| {
            std::fs::write(scratch.join("a.txt"), b"hello").unwrap();
            Ok(((), false))
        })
        .unwrap();

        assert!(!target.path().join("a.txt").exists());
    }

    // P8: failed op leaves target untouched.
    #[test]
    fn error_leaves_target_dir_unchanged() {
        let target = tempfile::tempdir().unwrap();
        std::fs::write(target.path().join("existing.txt"), b"original").unwrap();

        let result: Result<(), EngineError> =
            do_atomically(target.path(), "valsync-test", |scratch| {
                std::fs::write(scratch.join("a.txt"), b"hello").unwrap();
                Err(EngineError::transport("simulated failure"))
            });

        assert!(result.is_err());
        assert!(!target.path().join("a.txt").exists());
        assert_eq!(
            std::fs::read(target.path().join("existing.txt")).unwrap(),
            b"original"
        );
    }

    #[test]
    fn copy_merge_preserves_existing_target_only_files() {
        let target = tempfile::tempdir().unwrap();
        std::fs::write(target.path().join("keep.txt"), b"keep me").unwrap();

        do_atomically(target.path(), "valsync-test", |scratch| {
            std::fs::write(scratch.join("new.txt"), b"new").unwrap();
            Ok(((), true))
        })
        .unwrap();

        assert_eq!(std::fs::read(target.path().join("keep.txt")).unwrap(), b"keep me");
        assert_eq!(std::fs::read(target.path().join("new.txt")).unwrap(), b"new");
    }
}
