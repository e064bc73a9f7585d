//! Error types for geo file parsing and media matching.

use std::io;
use thiserror::Error;

/// Fatal errors raised while handling a single geo file or interaction.
#[derive(Debug, Error)]
pub enum GeoMediaError {
    /// The GPX document is not well formed.
    #[error("GPX parsing error: {0}")]
    GpxParse(String),

    /// The KML document is not well formed.
    #[error("KML parsing error: {0}")]
    KmlParse(String),

    /// A KML coordinates field holds a token that is not a number.
    #[error("invalid coordinates {text:?}")]
    CoordinateFormat { text: String },

    /// The geo file extension maps to no known parser.
    #[error("unsupported geo file: {0}")]
    UnsupportedFormat(String),

    /// The media file extension is neither an accepted image nor video type.
    #[error("unsupported media file: {0}")]
    UnsupportedMedia(String),

    /// Two files of one report would be written under the same name.
    #[error("output name {0:?} is used more than once")]
    OutputNameCollision(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeoMediaError>;

/// Non-fatal conditions reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The geo file parsed but produced nothing to match or convert.
    NoPointsFound { source: String },
    /// No geo record carries this media file's name.
    UnmatchedMedia { filename: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoPointsFound { source } => write!(f, "No points found in {}", source),
            Notice::UnmatchedMedia { filename } => {
                write!(f, "{} not found in geo file", filename)
            }
        }
    }
}
