use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use tempfile::TempDir;

use crate::error::Result;
use crate::matcher::basename;

/// An uploaded file: its name as given by the user and its raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload { name: name.into(), bytes }
    }

    /// Function to read a file from disk, keeping only its bare file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Upload { name, bytes })
    }
}

/// Temporary storage for the uploads of one interaction.
///
/// The directory and everything staged in it is removed when this value is
/// dropped, whichever way the interaction ends.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("geomedia-").tempdir()?;
        debug!("Staging uploads in {}", dir.path().display());
        Ok(Staging { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes the upload under its bare name and returns the staged path.
    pub fn stage(&self, upload: &Upload) -> Result<PathBuf> {
        let path = self.dir.path().join(basename(&upload.name));
        fs::write(&path, &upload.bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_files_hold_upload_bytes() {
        let staging = Staging::new().unwrap();
        let path = staging.stage(&Upload::new("photo.jpg", vec![1, 2, 3])).unwrap();

        assert_eq!(path.parent(), Some(staging.path()));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn directories_in_upload_names_are_dropped() {
        let staging = Staging::new().unwrap();
        let path = staging.stage(&Upload::new("nested/dir/clip.mp4", vec![9])).unwrap();

        assert_eq!(path, staging.path().join("clip.mp4"));
    }

    #[test]
    fn dropping_staging_removes_everything() {
        let staging = Staging::new().unwrap();
        let root = staging.path().to_path_buf();
        let staged = staging.stage(&Upload::new("a.png", vec![0])).unwrap();

        drop(staging);

        assert!(!staged.exists());
        assert!(!root.exists());
    }

    #[test]
    fn upload_from_path_keeps_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.gpx");
        fs::write(&path, b"<gpx/>").unwrap();

        let upload = Upload::from_path(&path).unwrap();

        assert_eq!(upload.name, "track.gpx");
        assert_eq!(upload.bytes, b"<gpx/>".to_vec());
    }
}
