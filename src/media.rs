//! Media kind of a camera file, decided from its extension.

/// Video extensions produced by the supported cameras.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "lrv", "mov"];

/// Photo extensions produced by the supported cameras.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gpr"];

/// File kind decided from the extension.
///
/// Selects the metadata backend used to read the capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
    Unsupported,
}

impl MediaKind {
    /// Classify an extension, with or without the leading dot, ignoring case.
    ///
    /// ```rust
    /// use gopro_rename::media::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_extension(".MP4"), MediaKind::Video);
    /// assert_eq!(MediaKind::from_extension("jpg"), MediaKind::Image);
    /// assert_eq!(MediaKind::from_extension(".THM"), MediaKind::Unsupported);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        if VIDEO_EXTENSIONS.iter().any(|ext| ext.eq_ignore_ascii_case(extension)) {
            Self::Video
        } else if IMAGE_EXTENSIONS.iter().any(|ext| ext.eq_ignore_ascii_case(extension)) {
            Self::Image
        } else {
            Self::Unsupported
        }
    }

    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_extensions_any_case() {
        assert_eq!(MediaKind::from_extension(".MP4"), MediaKind::Video);
        assert_eq!(MediaKind::from_extension(".mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_extension("LRV"), MediaKind::Video);
    }

    #[test]
    fn image_extensions_any_case() {
        assert_eq!(MediaKind::from_extension(".JPG"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension(".jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension(".GPR"), MediaKind::Image);
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        assert_eq!(MediaKind::from_extension(".THM"), MediaKind::Unsupported);
        assert_eq!(MediaKind::from_extension(".MP4.bak"), MediaKind::Unsupported);
        assert_eq!(MediaKind::from_extension(""), MediaKind::Unsupported);
        assert!(!MediaKind::Unsupported.is_supported());
    }
}
