//! Geotag media files from GPX or KML data and convert geo files to GeoJSON.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use geojson::FeatureCollection;
use log::{info, warn};

pub mod emitter;
pub mod error;
pub mod geometry;
pub mod gpx;
pub mod kml;
pub mod matcher;
pub mod media;
pub mod staging;

pub use error::{GeoMediaError, Notice, Result};
pub use geometry::{GeoFeature, GeoPoint, GeoRecord, Shape};
pub use matcher::{GeoLookup, MatchOutcome};
pub use media::{MediaKind, MediaType};
pub use staging::{Staging, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoFormat {
    Gpx,
    Kml,
}

impl GeoFormat {
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("gpx") => Ok(GeoFormat::Gpx),
            Some("kml") => Ok(GeoFormat::Kml),
            _ => Err(GeoMediaError::UnsupportedFormat(filename.to_string())),
        }
    }

    /// Runs the parser for this format over a whole document.
    pub fn extract(self, bytes: &[u8]) -> Result<Vec<GeoRecord>> {
        let records: Vec<GeoRecord> = match self {
            GeoFormat::Gpx => gpx::extract_points(bytes)?.into_iter().map(GeoRecord::from).collect(),
            GeoFormat::Kml => kml::extract_features(bytes)?.into_iter().map(GeoRecord::from).collect(),
        };
        info!("Extracted {} records from {:?} document", records.len(), self);
        Ok(records)
    }
}

/// Outcome of a bulk conversion.
#[derive(Debug)]
pub struct Conversion {
    pub collection: FeatureCollection,
    pub notices: Vec<Notice>,
}

/// Function to convert a whole GPX or KML document into one FeatureCollection.
pub fn convert(upload: &Upload) -> Result<Conversion> {
    let format = GeoFormat::from_filename(&upload.name)?;
    let records = format.extract(&upload.bytes)?;

    let mut notices = Vec::new();
    if records.is_empty() {
        notices.push(no_points_found(&upload.name));
    }

    Ok(Conversion {
        collection: emitter::bulk(&records),
        notices,
    })
}

pub fn convert_file(path: &Path) -> Result<Conversion> {
    convert(&Upload::from_path(path)?)
}

/// A media file that found its location.
#[derive(Debug)]
pub struct MatchedMedia {
    pub filename: String,
    pub media_type: MediaType,
    pub location: Option<(f64, f64)>,
    pub collection: FeatureCollection,
    pub output_name: String,
    staged_path: PathBuf,
}

impl MatchedMedia {
    /// Caption in the form `name @ (lat, lon)`.
    pub fn caption(&self) -> String {
        match self.location {
            Some((lat, lon)) => format!("{} @ ({:?}, {:?})", self.filename, lat, lon),
            None => self.filename.clone(),
        }
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged_path
    }
}

/// Everything produced by one media-matching interaction.
///
/// Owns the staging area, so staged media stay readable until the report
/// is dropped.
#[derive(Debug)]
pub struct MatchReport {
    pub matched: Vec<MatchedMedia>,
    pub notices: Vec<Notice>,
    staging: Staging,
}

impl MatchReport {
    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }

    /// Writes each matched file's GeoJSON under its output name and copies
    /// the media file next to it. Returns the written paths.
    ///
    /// Fails before writing anything if two outputs share a name.
    pub fn write_to(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut names = HashSet::new();
        for media in &self.matched {
            for name in [&media.output_name, &media.filename] {
                if !names.insert(name.as_str()) {
                    return Err(GeoMediaError::OutputNameCollision(name.clone()));
                }
            }
        }

        fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();

        for media in &self.matched {
            let geojson_path = output_dir.join(&media.output_name);
            fs::write(&geojson_path, emitter::to_pretty_json(&media.collection)?)?;
            info!("Written {}", geojson_path.display());
            written.push(geojson_path);

            let media_path = output_dir.join(&media.filename);
            fs::copy(&media.staged_path, &media_path)?;
            written.push(media_path);
        }

        Ok(written)
    }
}

/// Default GeoJSON name for a media file: its stem plus `.geojson`.
pub fn default_output_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    format!("{}.geojson", stem)
}

/// Function to locate every media upload using the records of one geo file.
///
/// `output_names` maps a media filename to the GeoJSON name it should be
/// written under; files without an entry get [`default_output_name`].
pub fn match_uploads(
    geo: &Upload,
    media: &[Upload],
    output_names: &HashMap<String, String>,
) -> Result<MatchReport> {
    // Dispatch on file types before touching the disk
    let format = GeoFormat::from_filename(&geo.name)?;
    let media_types = media
        .iter()
        .map(|upload| MediaType::from_filename(&upload.name))
        .collect::<Result<Vec<_>>>()?;

    // Buffer uploads for the duration of this interaction
    let staging = Staging::new()?;
    let mut staged_paths = Vec::with_capacity(media.len());
    for upload in media {
        staged_paths.push(staging.stage(upload)?);
    }

    let records = format.extract(&geo.bytes)?;
    let mut report = MatchReport {
        matched: Vec::new(),
        notices: Vec::new(),
        staging,
    };

    if records.is_empty() {
        report.notices.push(no_points_found(&geo.name));
        return Ok(report);
    }

    // Join media filenames against the record names
    let lookup = GeoLookup::build(&records);
    info!("Built lookup of {} named records", lookup.len());
    let filenames: Vec<&str> = media.iter().map(|upload| upload.name.as_str()).collect();
    let outcomes = matcher::match_media(&lookup, &filenames);

    for ((outcome, media_type), staged_path) in outcomes.into_iter().zip(media_types).zip(staged_paths) {
        match outcome {
            MatchOutcome::Matched { filename, record } => {
                // User supplied name wins over the default
                let output_name = output_names
                    .get(&filename)
                    .cloned()
                    .unwrap_or_else(|| default_output_name(&filename));
                let matched = MatchedMedia {
                    collection: emitter::media_feature(record, &filename, media_type),
                    location: record.location(),
                    filename,
                    media_type,
                    output_name,
                    staged_path,
                };
                info!("Matched {} ({})", matched.caption(), media_type.mime_type());
                report.matched.push(matched);
            }
            MatchOutcome::Unmatched { filename } => {
                let notice = Notice::UnmatchedMedia { filename };
                warn!("{}", notice);
                report.notices.push(notice);
            }
        }
    }

    Ok(report)
}

fn no_points_found(source: &str) -> Notice {
    let notice = Notice::NoPointsFound { source: source.to_string() };
    warn!("{}", notice);
    notice
}
