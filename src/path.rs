use std::path::{Path, PathBuf};

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/projects/w` -> `~/projects/w`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// Normalize a path's separators to `/` for use as a `ValItem`/`LocalItem` path key.
///
/// Remote paths and ignore-rule matching are defined over `/`-separated,
/// relative paths with no leading `/` (spec §3.1, §4.1). This is a pure
/// string operation — it does not touch the filesystem.
pub fn to_item_path(relative: &Path) -> String {
    use path_slash::PathExt as _;

    let slashed = relative.to_slash_lossy().to_string();
    slashed.strip_prefix('/').map(str::to_string).unwrap_or(slashed)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{format_path_for_display, home_dir, to_item_path};

    #[test]
    fn shortens_path_under_home() {
        let Some(home) = home_dir() else {
            return;
        };

        let path = home.join("projects").join("w");
        let formatted = format_path_for_display(&path);

        assert!(
            formatted.starts_with("~"),
            "Expected tilde prefix, got {formatted}"
        );
        assert!(formatted.contains("projects"));
        assert!(formatted.ends_with('w'));
    }

    #[test]
    fn shows_home_as_tilde() {
        let Some(home) = home_dir() else {
            return;
        };

        assert_eq!(format_path_for_display(&home), "~");
    }

    #[test]
    fn leaves_non_home_paths_unchanged() {
        let path = PathBuf::from("/tmp/valsync-non-home-path");
        assert_eq!(format_path_for_display(&path), path.display().to_string());
    }

    #[test]
    fn test_home_dir_returns_valid_path() {
        if let Some(home) = home_dir() {
            assert!(home.is_absolute());
            assert!(home.components().count() > 0);
        }
    }

    #[test]
    fn item_path_uses_forward_slashes() {
        let p = PathBuf::from("api").join("hello.ts");
        assert_eq!(to_item_path(&p), "api/hello.ts");
    }

    #[test]
    fn item_path_has_no_leading_slash() {
        let p = PathBuf::from("/readme.md");
        assert_eq!(to_item_path(&p), "readme.md");
    }
}
