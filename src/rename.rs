//! Rename executor.
//!
//! Applies planned renames one at a time. Failures are collected per file
//! and never stop the remaining renames.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::RenameError;
use crate::naming::RenamePair;

/// How files are moved to their new name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// Rename in place.
    #[default]
    Rename,
    /// Keep the original and write a copy with the new name,
    /// preserving the modification time.
    Copy,
}

/// Filesystem primitive used by the executor.
pub trait FileOperation {
    /// Move or copy `source` to `target`.
    ///
    /// # Errors
    /// Returns the underlying IO error.
    fn transfer(&self, source: &Path, target: &Path) -> io::Result<()>;

    /// True if anything is at `path`, including a dangling symlink.
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }
}

/// Local filesystem implementation of [`FileOperation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem {
    mode: TransferMode,
}

/// A rename that failed.
#[derive(Debug)]
pub struct RenameFailure {
    pub pair: RenamePair,
    pub error: RenameError,
}

/// Outcome of executing a batch of renames.
#[derive(Debug, Default)]
pub struct RenameReport {
    pub completed: Vec<RenamePair>,
    pub failures: Vec<RenameFailure>,
}

/// Applies rename pairs inside one directory.
pub struct RenameExecutor<'a, F: FileOperation> {
    directory: &'a Path,
    operation: F,
    overwrite: bool,
}

impl LocalFileSystem {
    #[must_use]
    pub const fn new(mode: TransferMode) -> Self {
        Self { mode }
    }

    fn copy_with_metadata(source: &Path, target: &Path) -> io::Result<()> {
        fs::copy(source, target)?;
        let modified = fs::metadata(source)?.modified()?;
        fs::File::options().write(true).open(target)?.set_modified(modified)
    }
}

impl FileOperation for LocalFileSystem {
    fn transfer(&self, source: &Path, target: &Path) -> io::Result<()> {
        match self.mode {
            TransferMode::Rename => fs::rename(source, target),
            TransferMode::Copy => Self::copy_with_metadata(source, target),
        }
    }
}

impl<'a, F: FileOperation> RenameExecutor<'a, F> {
    pub const fn new(directory: &'a Path, operation: F, overwrite: bool) -> Self {
        Self {
            directory,
            operation,
            overwrite,
        }
    }

    /// Apply all pairs in order.
    pub fn execute(&self, pairs: &[RenamePair]) -> RenameReport {
        self.execute_with(pairs, |_, _| {})
    }

    /// Apply all pairs in order, calling `observer` after each one.
    pub fn execute_with(
        &self,
        pairs: &[RenamePair],
        mut observer: impl FnMut(&RenamePair, Option<&RenameError>),
    ) -> RenameReport {
        let mut report = RenameReport::default();
        for pair in pairs {
            match self.apply(pair) {
                Ok(()) => {
                    observer(pair, None);
                    report.completed.push(pair.clone());
                }
                Err(error) => {
                    observer(pair, Some(&error));
                    report.failures.push(RenameFailure {
                        pair: pair.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    fn apply(&self, pair: &RenamePair) -> crate::Result<()> {
        let source = self.directory.join(&pair.old_name);
        let target = self.directory.join(&pair.new_name);
        let failed = |error: io::Error| RenameError::RenameFailed {
            from: pair.old_name.clone(),
            to: pair.new_name.clone(),
            error,
        };

        if !self.overwrite && self.operation.exists(&target) {
            return Err(failed(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "target already exists",
            )));
        }
        self.operation.transfer(&source, &target).map_err(failed)
    }
}

impl RenameReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
