use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use gopro_rename::rename::TransferMode;

use crate::Args;

/// Default ffprobe executable, looked up from `PATH`.
const DEFAULT_FFPROBE: &str = "ffprobe";

/// Final config created from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) dryrun: bool,
    pub(crate) ffprobe: PathBuf,
    pub(crate) log: bool,
    pub(crate) overwrite: bool,
    pub(crate) transfer_mode: TransferMode,
    pub(crate) verbose: bool,
}

/// Config from a config file
#[derive(Debug, Default, Deserialize)]
struct RenameConfig {
    #[serde(default)]
    copy: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    ffprobe: Option<PathBuf>,
    #[serde(default)]
    log: bool,
    #[serde(default)]
    overwrite: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    gopro_rename: RenameConfig,
}

impl RenameConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = gopro_rename::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.gopro_rename)
            .context("Failed to parse gopro_rename config TOML")
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let user_config = RenameConfig::get_user_config()?;
        Ok(Self::from_parts(args, user_config))
    }

    fn from_parts(args: &Args, user_config: RenameConfig) -> Self {
        // args > config > default
        let ffprobe = args
            .ffprobe
            .clone()
            .or(user_config.ffprobe)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FFPROBE));

        let transfer_mode = if args.copy || user_config.copy {
            TransferMode::Copy
        } else {
            TransferMode::Rename
        };

        Self {
            dryrun: args.print || user_config.dryrun,
            ffprobe,
            log: args.log || user_config.log,
            overwrite: args.force || user_config.overwrite,
            transfer_mode,
            verbose: args.verbose || user_config.verbose,
        }
    }
}
