//! Engine error types and formatting.
//!
//! One variant per §7 error taxonomy entry. Leaf functions return
//! `Result<T, EngineError>`; orchestrators decide whether to retry, prompt,
//! or let `?` convert into `anyhow::Error` on the way out to `main`.

use std::path::PathBuf;

use crate::status::ItemStatusManager;
use crate::styling::{ERROR, ERROR_BOLD, ERROR_EMOJI, HINT, HINT_EMOJI, format_with_gutter};

#[derive(Debug)]
pub enum EngineError {
    /// A local path or remote resource does not exist.
    NotFound { what: String },
    /// Remote 409: already exists, or a version mismatch.
    Conflict { what: String },
    /// Precondition failure before a destructive op (checkout without `-f`).
    /// Carries the dangerous-changes subset so the caller can display it.
    DirtyWorkingCopy { dangerous: Box<ItemStatusManager> },
    /// Target path for clone/create/remix exists and is non-empty.
    UnsafeDirectory { path: PathBuf },
    /// API key absent or rejected.
    AuthMissing,
    /// Any other remote error.
    Transport { message: String },
    /// On-disk state file matches neither the current nor a known legacy schema.
    InvalidSchema { message: String },
    /// Invariant violation that should never happen from valid input.
    ProgrammerError { message: String },
    /// Wrapped local I/O failure.
    Io(std::io::Error),
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound { what: what.into() }
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        EngineError::Conflict { what: what.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        EngineError::Transport {
            message: message.into(),
        }
    }

    pub fn programmer(message: impl Into<String>) -> Self {
        EngineError::ProgrammerError {
            message: message.into(),
        }
    }

    /// Whether this error is one of the two the Watcher swallows after
    /// logging (remote 404, local not-found) per §4.11 step (d).
    pub fn is_watcher_recoverable(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound { what } => {
                write!(f, "{ERROR_EMOJI} {ERROR}Not found: {what}{ERROR:#}")
            }

            EngineError::Conflict { what } => {
                write!(
                    f,
                    "{ERROR_EMOJI} {ERROR}Conflict: {ERROR_BOLD}{what}{ERROR_BOLD:#}{ERROR} already exists{ERROR:#}"
                )
            }

            EngineError::DirtyWorkingCopy { dangerous } => {
                write!(
                    f,
                    "{ERROR_EMOJI} {ERROR}Working copy has uncommitted local changes that would be lost{ERROR:#}\n\n"
                )?;
                let listed = dangerous
                    .entries(false)
                    .into_iter()
                    .map(|(bucket, paths)| format!("{bucket}: {}", paths.join(", ")))
                    .collect::<Vec<_>>()
                    .join("\n");
                if !listed.is_empty() {
                    write!(f, "{}", format_with_gutter(&listed, "", None))?;
                }
                write!(
                    f,
                    "\n{HINT_EMOJI} {HINT}Pass --force to discard these changes, or pull/push first{HINT:#}"
                )
            }

            EngineError::UnsafeDirectory { path } => {
                write!(
                    f,
                    "{ERROR_EMOJI} {ERROR}Directory {ERROR_BOLD}{}{ERROR_BOLD:#}{ERROR} already exists and is not empty{ERROR:#}\n\n{HINT_EMOJI} {HINT}Choose a different directory or remove its contents{HINT:#}",
                    path.display()
                )
            }

            EngineError::AuthMissing => {
                write!(
                    f,
                    "{ERROR_EMOJI} {ERROR}No API key configured{ERROR:#}\n\n{HINT_EMOJI} {HINT}Run 'valsync login' or set API_KEY{HINT:#}"
                )
            }

            EngineError::Transport { message } => {
                write!(f, "{ERROR_EMOJI} {ERROR}Remote request failed: {message}{ERROR:#}")
            }

            EngineError::InvalidSchema { message } => {
                write!(
                    f,
                    "{ERROR_EMOJI} {ERROR}Working copy state is not a recognized schema: {message}{ERROR:#}"
                )
            }

            EngineError::ProgrammerError { message } => {
                write!(f, "{ERROR_EMOJI} {ERROR}Internal error: {message}{ERROR:#}")
            }

            EngineError::Io(e) => write!(f, "{ERROR_EMOJI} {ERROR}{e}{ERROR:#}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::NotFound {
                what: e.to_string(),
            },
            _ => EngineError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_message() {
        let err = EngineError::not_found("val abc123");
        assert!(err.to_string().contains("val abc123"));
    }

    #[test]
    fn io_not_found_converts_to_engine_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn watcher_recoverable_only_for_not_found() {
        assert!(EngineError::not_found("x").is_watcher_recoverable());
        assert!(!EngineError::conflict("x").is_watcher_recoverable());
    }
}
