//! Recognizers for the camera filename shapes.
//!
//! Each shape has its own matcher that decomposes a filename into its fixed-width fields.
//! Matching is anchored at the start of the name and the extension is captured
//! from the first `.` onwards, so `GOPR12345.MP4` or `GOPRO1234.JPG` never match.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

// Static variables that are initialised at runtime the first time they are accessed.

static RE_CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GP(?P<chapter>\d{2})(?P<number>\d{4})(?P<extension>\..*)")
        .expect("Failed to create regex pattern for chaptered video")
});

static RE_BURST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^G(?P<burst>\d{3})(?P<number>\d{4})(?P<extension>\..*)")
        .expect("Failed to create regex pattern for burst item")
});

static RE_STEREO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^3D_(?P<direction>[LR])(?P<number>\d{4})(?P<extension>\..*)")
        .expect("Failed to create regex pattern for 3D recording")
});

static RE_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GOPR(?P<number>\d{4})(?P<extension>\..*)").expect("Failed to create regex pattern for single file")
});

/// Chapter index given to the implicit first segment of a chaptered video.
pub const FIRST_CHAPTER: &str = "00";

/// Common accessors shared by all recognized files.
pub trait CameraFile {
    /// Original filename.
    fn name(&self) -> &str;

    /// Extension including the leading dot, case preserved.
    fn extension(&self) -> &str;

    /// Four-digit camera file number.
    fn file_number(&self) -> &str;
}

/// Stereo recording side.
///
/// Ordering puts `Left` before `Right`, which is the order used inside a stereo group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// Segment of a chaptered video: `GP<xx><zzzz>.<ext>`,
/// or the implicit first segment `GOPR<zzzz>.<ext>` with chapter index `00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFile {
    pub name: String,
    pub chapter: String,
    pub file_number: String,
    pub extension: String,
}

/// Burst, time-lapse photo or looping video item: `G<yyy><zzzz>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstFile {
    pub name: String,
    pub burst_number: String,
    pub file_number: String,
    pub extension: String,
}

/// One side of a 3D recording: `3D_<L|R><zzzz>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoFile {
    pub name: String,
    pub direction: Direction,
    pub file_number: String,
    pub extension: String,
}

/// Single video or photo: `GOPR<zzzz>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFile {
    pub name: String,
    pub file_number: String,
    pub extension: String,
}

impl Direction {
    /// Parse the direction tag used in filenames.
    #[must_use]
    pub const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl ChapterFile {
    /// Match a chapter continuation `GP<xx><zzzz>.<ext>`.
    #[must_use]
    pub fn parse_continuation(name: &str) -> Option<Self> {
        let captures = RE_CHAPTER.captures(name)?;
        Some(Self {
            name: name.to_string(),
            chapter: captures["chapter"].to_string(),
            file_number: captures["number"].to_string(),
            extension: captures["extension"].to_string(),
        })
    }

    /// Turn a `GOPR<zzzz>` file into the first segment of its chapter group.
    #[must_use]
    pub fn first_segment(file: SingleFile) -> Self {
        Self {
            name: file.name,
            chapter: FIRST_CHAPTER.to_string(),
            file_number: file.file_number,
            extension: file.extension,
        }
    }

    /// True for the implicit first segment.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.name.starts_with("GOPR")
    }
}

impl BurstFile {
    /// Match a burst item `G<yyy><zzzz>.<ext>`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = RE_BURST.captures(name)?;
        Some(Self {
            name: name.to_string(),
            burst_number: captures["burst"].to_string(),
            file_number: captures["number"].to_string(),
            extension: captures["extension"].to_string(),
        })
    }
}

impl StereoFile {
    /// Match a 3D recording `3D_<L|R><zzzz>.<ext>`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = RE_STEREO.captures(name)?;
        let direction = captures["direction"].chars().next().and_then(Direction::from_tag)?;
        Some(Self {
            name: name.to_string(),
            direction,
            file_number: captures["number"].to_string(),
            extension: captures["extension"].to_string(),
        })
    }
}

impl SingleFile {
    /// Match `GOPR<zzzz>.<ext>`.
    ///
    /// The same shape is used for the first segment of a chaptered video,
    /// the grouping engine decides which one it is.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = RE_SINGLE.captures(name)?;
        Some(Self {
            name: name.to_string(),
            file_number: captures["number"].to_string(),
            extension: captures["extension"].to_string(),
        })
    }
}

macro_rules! impl_camera_file {
    ($($file:ty),+) => {
        $(
            impl CameraFile for $file {
                fn name(&self) -> &str {
                    &self.name
                }

                fn extension(&self) -> &str {
                    &self.extension
                }

                fn file_number(&self) -> &str {
                    &self.file_number
                }
            }
        )+
    };
}

impl_camera_file!(ChapterFile, BurstFile, StereoFile, SingleFile);
