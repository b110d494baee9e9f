//! IgnoreEngine (C1): decide whether a path is ignored given layered ignore
//! rules.
//!
//! Rules are gitignore-semantic (negation with `!`, directory-only patterns
//! with a trailing `/`, anchored patterns with a leading `/`), built on the
//! `ignore` crate's `Gitignore` matcher rather than hand-rolling glob
//! matching — the same crate the teacher uses for its own directory walks.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// A built-in pattern set applied before any user-supplied rules, mirroring
/// what a fresh val client would never want to sync: its own control
/// directory and common VCS/editor noise.
const DEFAULT_PATTERNS: &[&str] = &[".vt/", ".git/", ".DS_Store", "node_modules/"];

/// Layered, compiled ignore rules: (a) built-in defaults, (b) a global
/// ignore file referenced by user config, (c) a per-working-copy ignore
/// file at the root (§3.1).
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Build the layered rule set for a working copy rooted at `root`.
    ///
    /// `global_ignore_files` come from user config (§9); `local_ignore_file`
    /// is the per-copy `.vtignore`, if present.
    pub fn build(
        root: &Path,
        global_ignore_files: &[std::path::PathBuf],
        local_ignore_file: Option<&Path>,
    ) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in DEFAULT_PATTERNS {
            builder.add_line(None, pattern)?;
        }

        for path in global_ignore_files {
            if path.is_file() {
                builder.add(path);
            }
        }

        if let Some(path) = local_ignore_file
            && path.is_file()
        {
            builder.add(path);
        }

        let matcher = builder.build()?;
        Ok(Self { matcher })
    }

    /// `is_ignored(path, rules, root?)`: the optional `root` enables
    /// directory-collapse mode, where a directory counts as ignored only
    /// when every reachable file beneath it is denied.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(path, is_dir).is_ignore()
    }

    /// Directory-collapse mode (§4.1): `dir` is ignored iff every file
    /// reachable below it is denied by the rules. `walk` enumerates the
    /// files beneath `dir` relative to the working-copy root.
    pub fn is_dir_ignored_collapsed(&self, dir: &Path, files_below: &[std::path::PathBuf]) -> bool {
        if files_below.is_empty() {
            return self.is_ignored(dir, true);
        }
        files_below.iter().all(|f| self.is_ignored(f, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_patterns_ignore_control_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = IgnoreRules::build(tmp.path(), &[], None).unwrap();
        assert!(rules.is_ignored(Path::new(".vt/state.json"), false));
    }

    #[test]
    fn untracked_file_is_not_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = IgnoreRules::build(tmp.path(), &[], None).unwrap();
        assert!(!rules.is_ignored(Path::new("readme.md"), false));
    }

    #[test]
    fn local_ignore_file_patterns_apply() {
        let tmp = tempfile::tempdir().unwrap();
        let ignore_path = tmp.path().join(".vtignore");
        let mut f = std::fs::File::create(&ignore_path).unwrap();
        writeln!(f, "*.secret").unwrap();

        let rules = IgnoreRules::build(tmp.path(), &[], Some(&ignore_path)).unwrap();
        assert!(rules.is_ignored(Path::new("creds.secret"), false));
        assert!(!rules.is_ignored(Path::new("creds.txt"), false));
    }

    #[test]
    fn negation_un_ignores_a_previously_ignored_path() {
        let tmp = tempfile::tempdir().unwrap();
        let ignore_path = tmp.path().join(".vtignore");
        let mut f = std::fs::File::create(&ignore_path).unwrap();
        writeln!(f, "*.log").unwrap();
        writeln!(f, "!keep.log").unwrap();

        let rules = IgnoreRules::build(tmp.path(), &[], Some(&ignore_path)).unwrap();
        assert!(rules.is_ignored(Path::new("debug.log"), false));
        assert!(!rules.is_ignored(Path::new("keep.log"), false));
    }

    #[test]
    fn directory_collapse_requires_every_file_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let ignore_path = tmp.path().join(".vtignore");
        let mut f = std::fs::File::create(&ignore_path).unwrap();
        writeln!(f, "build/*.log").unwrap();

        let rules = IgnoreRules::build(tmp.path(), &[], Some(&ignore_path)).unwrap();
        let all_ignored = vec![
            std::path::PathBuf::from("build/a.log"),
            std::path::PathBuf::from("build/b.log"),
        ];
        assert!(rules.is_dir_ignored_collapsed(Path::new("build"), &all_ignored));

        let mixed = vec![
            std::path::PathBuf::from("build/a.log"),
            std::path::PathBuf::from("build/keep.txt"),
        ];
        assert!(!rules.is_dir_ignored_collapsed(Path::new("build"), &mixed));
    }
}
