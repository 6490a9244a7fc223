//! Per-entry errors for name synthesis and renaming.
//!
//! None of these abort a batch: each failing entry is skipped and reported.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for per-entry operations.
pub type Result<T> = std::result::Result<T, RenameError>;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("No capture time for {}: {reason}", path.display())]
    MetadataUnavailable { path: PathBuf, reason: String },

    #[error("Unsupported file extension '{extension}' for {name}")]
    UnsupportedExtension { name: String, extension: String },

    #[error("Target name {target} is already used by {existing}")]
    TargetCollision { target: String, existing: String },

    #[error("Failed to rename {from} to {to}: {error}")]
    RenameFailed {
        from: String,
        to: String,
        #[source]
        error: io::Error,
    },
}

impl RenameError {
    pub(crate) fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short label used in reports and log files.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MetadataUnavailable { .. } => "metadata",
            Self::UnsupportedExtension { .. } => "extension",
            Self::TargetCollision { .. } => "collision",
            Self::RenameFailed { .. } => "rename",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_error_message_contains_path() {
        let error = RenameError::metadata("/media/GOPR1234.MP4", "missing creation_time");
        let message = error.to_string();
        assert!(message.contains("GOPR1234.MP4"));
        assert!(message.contains("missing creation_time"));
        assert_eq!(error.label(), "metadata");
    }

    #[test]
    fn rename_failed_keeps_io_source() {
        let error = RenameError::RenameFailed {
            from: "GOPR1234.MP4".to_string(),
            to: "2020-01-01_10h00m00s_1234.MP4".to_string(),
            error: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
        };
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().contains("target already exists"));
    }
}
