use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use gopro_rename::RenameError;
use gopro_rename::naming::RenamePair;

use crate::config::Config;

/// Simple file logger for rename operations with buffered writes
pub struct RenameLog {
    writer: BufWriter<File>,
}

impl RenameLog {
    /// Create a new file logger, writing to ~/logs/gopro-rename/gopro_rename_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::in_directory(&home_dir.join("logs").join(env!("CARGO_PKG_NAME")))
    }

    pub(crate) fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path: PathBuf = log_dir.join(format!(
            "gopro_rename_{}.log",
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        ));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, root: &Path, config: &Config) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), root.display());
        let _ = writeln!(self.writer, "  mode: {:?}", config.transfer_mode);
        let _ = writeln!(self.writer, "  ffprobe: {}", config.ffprobe.display());
        let _ = writeln!(self.writer, "  overwrite: {}", config.overwrite);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = self.writer.flush();
    }

    /// Log a file that was left out of renaming
    pub(crate) fn log_skip(&mut self, name: &str, error: &RenameError) {
        let _ = writeln!(
            self.writer,
            "[{}] SKIP    {} \"{}\" | {}",
            Self::timestamp(),
            error.label().to_uppercase(),
            name,
            error
        );
        let _ = self.writer.flush();
    }

    /// Log a successful rename
    pub(crate) fn log_rename(&mut self, pair: &RenamePair) {
        let _ = writeln!(
            self.writer,
            "[{}] RENAME  \"{}\" -> \"{}\"",
            Self::timestamp(),
            pair.old_name,
            pair.new_name
        );
        let _ = self.writer.flush();
    }

    /// Log a failed rename
    pub(crate) fn log_failure(&mut self, pair: &RenamePair, error: &RenameError) {
        let _ = writeln!(
            self.writer,
            "[{}] FAILED  \"{}\" -> \"{}\" | {}",
            Self::timestamp(),
            pair.old_name,
            pair.new_name,
            error
        );
        let _ = self.writer.flush();
    }

    /// Log final totals
    pub(crate) fn log_summary(&mut self, renamed: usize, skipped: usize, failed: usize) {
        let _ = writeln!(
            self.writer,
            "[{}] DONE    renamed: {renamed}, skipped: {skipped}, failed: {failed}",
            Self::timestamp()
        );
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_log(dir: &Path) -> String {
        let entry = fs::read_dir(dir)
            .unwrap()
            .filter_map(std::result::Result::ok)
            .find(|entry| entry.file_name().to_string_lossy().starts_with("gopro_rename_"))
            .expect("log file should exist");
        fs::read_to_string(entry.path()).unwrap()
    }

    #[test]
    fn writes_rename_and_failure_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let mut log = RenameLog::in_directory(&log_dir).unwrap();

        let pair = RenamePair::new("GOPR1234.MP4", "2018-03-04_12h30m45s_1234.MP4");
        log.log_rename(&pair);
        log.log_failure(
            &pair,
            &RenameError::RenameFailed {
                from: pair.old_name.clone(),
                to: pair.new_name.clone(),
                error: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "target already exists"),
            },
        );
        log.log_skip(
            "GOPR1216.THM",
            &RenameError::UnsupportedExtension {
                name: "GOPR1216.THM".to_string(),
                extension: ".THM".to_string(),
            },
        );
        log.log_summary(1, 1, 1);

        let content = read_log(&log_dir);
        assert!(content.contains("RENAME  \"GOPR1234.MP4\" -> \"2018-03-04_12h30m45s_1234.MP4\""));
        assert!(content.contains("FAILED"));
        assert!(content.contains("target already exists"));
        assert!(content.contains("SKIP    EXTENSION \"GOPR1216.THM\""));
        assert!(content.contains("renamed: 1, skipped: 1, failed: 1"));
    }
}
