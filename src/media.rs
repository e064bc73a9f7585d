use std::path::Path;

use crate::error::{GeoMediaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Accepted media file types, chosen once per file from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Mp4,
    Mov,
    Avi,
}

impl MediaType {
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => Ok(MediaType::Jpeg),
            Some("png") => Ok(MediaType::Png),
            Some("mp4") => Ok(MediaType::Mp4),
            Some("mov") => Ok(MediaType::Mov),
            Some("avi") => Ok(MediaType::Avi),
            _ => Err(GeoMediaError::UnsupportedMedia(filename.to_string())),
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            MediaType::Jpeg | MediaType::Png => MediaKind::Image,
            MediaType::Mp4 | MediaType::Mov | MediaType::Avi => MediaKind::Video,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Mp4 => "video/mp4",
            MediaType::Mov => "video/quicktime",
            MediaType::Avi => "video/x-msvideo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.jpg", MediaType::Jpeg, MediaKind::Image, "image/jpeg")]
    #[case("a.JPEG", MediaType::Jpeg, MediaKind::Image, "image/jpeg")]
    #[case("shot.png", MediaType::Png, MediaKind::Image, "image/png")]
    #[case("clip.mp4", MediaType::Mp4, MediaKind::Video, "video/mp4")]
    #[case("clip.MOV", MediaType::Mov, MediaKind::Video, "video/quicktime")]
    #[case("old.avi", MediaType::Avi, MediaKind::Video, "video/x-msvideo")]
    fn accepted_extensions(
        #[case] filename: &str,
        #[case] media_type: MediaType,
        #[case] kind: MediaKind,
        #[case] mime: &str,
    ) {
        let detected = MediaType::from_filename(filename).unwrap();
        assert_eq!(detected, media_type);
        assert_eq!(detected.kind(), kind);
        assert_eq!(detected.mime_type(), mime);
    }

    #[rstest]
    #[case("notes.txt")]
    #[case("archive.tar.gz")]
    #[case("no_extension")]
    #[case("image.gif")]
    fn other_extensions_are_rejected(#[case] filename: &str) {
        assert!(matches!(
            MediaType::from_filename(filename),
            Err(GeoMediaError::UnsupportedMedia(_))
        ));
    }
}
