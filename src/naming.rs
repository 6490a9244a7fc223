//! Target name synthesis.
//!
//! Names start with the capture time followed by the group fields of the source name:
//!
//! | Group   | Source                | Target                              |
//! |---------|-----------------------|-------------------------------------|
//! | Chapter | `GP<xx><zzzz>.<ext>`  | `<time>_<xx>_<zzzz>.<ext>`          |
//! | Chapter | `GOPR<zzzz>.<ext>`    | `<time>_00_<zzzz>.<ext>`            |
//! | Burst   | `G<yyy><zzzz>.<ext>`  | `<time>_<yyy>_<zzzz>.<ext>`         |
//! | Stereo  | `3D_<d><zzzz>.<ext>`  | `<time>_<zzzz>_<d>.<ext>`           |
//! | Single  | `GOPR<zzzz>.<ext>`    | `<time>_<zzzz>.<ext>`               |
//!
//! where `<time>` is `YYYY-MM-DD_HHhMMmSSs`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::RenameError;
use crate::group::{Classification, ClassifiedFile};
use crate::media::MediaKind;
use crate::metadata::MetadataSource;
use crate::pattern::Direction;

/// Capture time format used in target names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%Hh%Mm%Ss";

static RE_SYNTHESIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<time>\d{4}-\d{2}-\d{2}_\d{2}h\d{2}m\d{2}s)_(?:(?P<chapter>\d{2})_(?P<chapter_number>\d{4})|(?P<burst>\d{3})_(?P<burst_number>\d{4})|(?P<stereo_number>\d{4})_(?P<direction>[LR])|(?P<single_number>\d{4}))(?P<extension>\..*)",
    )
    .expect("Failed to create regex pattern for synthesized name")
});

/// Old and new filename for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub old_name: String,
    pub new_name: String,
}

/// A file that could not be given a new name.
#[derive(Debug)]
pub struct SynthesisFailure {
    pub name: String,
    pub error: RenameError,
}

/// Planned renames for one classification.
#[derive(Debug, Default)]
pub struct RenamePlan {
    pub pairs: Vec<RenamePair>,
    pub failures: Vec<SynthesisFailure>,
}

/// Builds target names using capture times from a metadata source.
pub struct NameSynthesizer<'a, M: MetadataSource> {
    directory: &'a Path,
    metadata: &'a M,
}

/// Fields recovered from a synthesized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesizedName {
    Chapter {
        timestamp: NaiveDateTime,
        chapter: String,
        file_number: String,
        extension: String,
    },
    Burst {
        timestamp: NaiveDateTime,
        burst_number: String,
        file_number: String,
        extension: String,
    },
    Stereo {
        timestamp: NaiveDateTime,
        file_number: String,
        direction: Direction,
        extension: String,
    },
    Single {
        timestamp: NaiveDateTime,
        file_number: String,
        extension: String,
    },
}

/// Format a capture time for use in a filename.
///
/// ```rust
/// use chrono::NaiveDate;
/// use gopro_rename::naming::format_timestamp;
///
/// let time = NaiveDate::from_ymd_opt(2018, 3, 4).unwrap().and_hms_opt(9, 5, 7).unwrap();
/// assert_eq!(format_timestamp(&time), "2018-03-04_09h05m07s");
/// ```
#[must_use]
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the target name for a classified file.
#[must_use]
pub fn target_name(file: ClassifiedFile<'_>, timestamp: &NaiveDateTime) -> String {
    let time = format_timestamp(timestamp);
    match file {
        ClassifiedFile::Chapter(file) => {
            format!("{time}_{}_{}{}", file.chapter, file.file_number, file.extension)
        }
        ClassifiedFile::Burst(file) => {
            format!("{time}_{}_{}{}", file.burst_number, file.file_number, file.extension)
        }
        ClassifiedFile::Stereo(file) => {
            format!("{time}_{}_{}{}", file.file_number, file.direction, file.extension)
        }
        ClassifiedFile::Single(file) => format!("{time}_{}{}", file.file_number, file.extension),
    }
}

impl<'a, M: MetadataSource> NameSynthesizer<'a, M> {
    pub const fn new(directory: &'a Path, metadata: &'a M) -> Self {
        Self { directory, metadata }
    }

    /// Create target names for all classified files.
    ///
    /// Files that fail are collected into `failures` and do not stop the others.
    /// A target name that was already given to an earlier file is a collision,
    /// the later file is skipped.
    pub fn synthesize(&self, classification: &Classification) -> RenamePlan {
        let mut plan = RenamePlan::default();
        let mut targets: HashMap<String, String> = HashMap::new();

        for file in classification.files() {
            match self.synthesize_file(file) {
                Ok(new_name) => {
                    if let Some(existing) = targets.get(&new_name) {
                        plan.failures.push(SynthesisFailure {
                            name: file.name().to_string(),
                            error: RenameError::TargetCollision {
                                target: new_name,
                                existing: existing.clone(),
                            },
                        });
                        continue;
                    }
                    targets.insert(new_name.clone(), file.name().to_string());
                    plan.pairs.push(RenamePair::new(file.name(), new_name));
                }
                Err(error) => plan.failures.push(SynthesisFailure {
                    name: file.name().to_string(),
                    error,
                }),
            }
        }

        plan
    }

    /// Create the target name for one file.
    ///
    /// # Errors
    /// Returns `UnsupportedExtension` without querying metadata for files that are neither video nor image,
    /// or the metadata error for that file.
    pub fn synthesize_file(&self, file: ClassifiedFile<'_>) -> crate::Result<String> {
        let kind = MediaKind::from_extension(file.extension());
        if !kind.is_supported() {
            return Err(RenameError::UnsupportedExtension {
                name: file.name().to_string(),
                extension: file.extension().to_string(),
            });
        }
        let path = self.path_for(file.name());
        let timestamp = self.metadata.capture_time(&path, kind)?;
        Ok(target_name(file, &timestamp))
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl RenamePair {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl fmt::Display for RenamePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old_name, self.new_name)
    }
}

impl SynthesizedName {
    /// Parse a name created by [`target_name`].
    ///
    /// ```rust
    /// use gopro_rename::naming::SynthesizedName;
    ///
    /// let name = SynthesizedName::parse("2018-03-04_12h30m45s_023_1111.JPG").unwrap();
    /// assert_eq!(name.group_key(), "023");
    /// assert_eq!(name.position(), Some("1111".to_string()));
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = RE_SYNTHESIZED.captures(name)?;
        let timestamp = NaiveDateTime::parse_from_str(&captures["time"], TIMESTAMP_FORMAT).ok()?;
        let extension = captures["extension"].to_string();

        if let (Some(chapter), Some(number)) = (captures.name("chapter"), captures.name("chapter_number")) {
            return Some(Self::Chapter {
                timestamp,
                chapter: chapter.as_str().to_string(),
                file_number: number.as_str().to_string(),
                extension,
            });
        }
        if let (Some(burst), Some(number)) = (captures.name("burst"), captures.name("burst_number")) {
            return Some(Self::Burst {
                timestamp,
                burst_number: burst.as_str().to_string(),
                file_number: number.as_str().to_string(),
                extension,
            });
        }
        if let (Some(number), Some(direction)) = (captures.name("stereo_number"), captures.name("direction")) {
            return Some(Self::Stereo {
                timestamp,
                file_number: number.as_str().to_string(),
                direction: direction.as_str().chars().next().and_then(Direction::from_tag)?,
                extension,
            });
        }
        let number = captures.name("single_number")?;
        Some(Self::Single {
            timestamp,
            file_number: number.as_str().to_string(),
            extension,
        })
    }

    /// File number for chapters, stereo pairs and singles, burst number for bursts.
    #[must_use]
    pub fn group_key(&self) -> &str {
        match self {
            Self::Chapter { file_number, .. } | Self::Stereo { file_number, .. } | Self::Single { file_number, .. } => {
                file_number
            }
            Self::Burst { burst_number, .. } => burst_number,
        }
    }

    /// Position inside the group: chapter index, burst file number or stereo direction.
    #[must_use]
    pub fn position(&self) -> Option<String> {
        match self {
            Self::Chapter { chapter, .. } => Some(chapter.clone()),
            Self::Burst { file_number, .. } => Some(file_number.clone()),
            Self::Stereo { direction, .. } => Some(direction.to_string()),
            Self::Single { .. } => None,
        }
    }

    #[must_use]
    pub const fn timestamp(&self) -> &NaiveDateTime {
        match self {
            Self::Chapter { timestamp, .. }
            | Self::Burst { timestamp, .. }
            | Self::Stereo { timestamp, .. }
            | Self::Single { timestamp, .. } => timestamp,
        }
    }
}
