//! Staging file handed to the converter
//!
//! The converter only accepts a file path, so the manifest set is written to
//! a uniquely named temp file for the duration of one call. The file is
//! removed when [`StagedManifests`] is dropped, on success, on error and
//! during unwinding.

use std::io::BufWriter;
use std::path::Path;

use tempfile::TempPath;
use tracing::debug;

use crate::manifest::codec;
use crate::manifest::Manifest;
use crate::{Error, Result};

const STAGING_PREFIX: &str = "ingress-modernizr-";
const STAGING_SUFFIX: &str = ".yaml";

/// A manifest set written to a temp file
#[derive(Debug)]
pub struct StagedManifests {
    path: TempPath,
}

impl StagedManifests {
    /// Encode `manifests` into a fresh temp file and close it
    pub fn write(manifests: &[Manifest]) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile()
            .map_err(|e| Error::staging(format!("failed to create temp file: {}", e)))?;

        let mut writer = BufWriter::new(file);
        codec::encode(manifests, &mut writer)
            .map_err(|e| Error::staging(format!("failed to write manifests to temp file: {}", e)))?;
        // into_inner flushes the buffer
        let file = writer
            .into_inner()
            .map_err(|e| Error::staging(format!("failed to close temp file: {}", e.error())))?;

        // Drops the handle; only the path guard remains
        let path = file.into_temp_path();
        debug!(path = %path.display(), count = manifests.len(), "staged manifests");
        Ok(Self { path })
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::fixtures::*;
    use std::path::PathBuf;

    #[test]
    fn staged_file_holds_the_encoded_set() {
        let set = vec![config_map("cfg"), ingress("web")];
        let staged = StagedManifests::write(&set).unwrap();

        let contents = std::fs::read(staged.path()).unwrap();
        assert_eq!(codec::decode(&contents).unwrap(), set);
    }

    #[test]
    fn staged_file_name_is_recognizable() {
        let staged = StagedManifests::write(&[config_map("cfg")]).unwrap();
        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("ingress-modernizr-"));
        assert!(name.ends_with(".yaml"));
        assert!(staged.path().starts_with(std::env::temp_dir()));
    }

    #[test]
    fn concurrent_stagings_do_not_collide() {
        let a = StagedManifests::write(&[config_map("a")]).unwrap();
        let b = StagedManifests::write(&[config_map("b")]).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn drop_removes_the_file() {
        let staged = StagedManifests::write(&[config_map("cfg")]).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn unwinding_removes_the_file() {
        let mut seen: Option<PathBuf> = None;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let staged = StagedManifests::write(&[config_map("cfg")]).unwrap();
            seen = Some(staged.path().to_path_buf());
            panic!("converter blew up");
        }));

        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
    }
}
