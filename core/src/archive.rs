//! Zip input extraction

use crate::error::{DcmvolError, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tempfile::TempDir;
use zip::ZipArchive;

/// Prefix of extraction directories
pub const EXTRACT_PREFIX: &str = "tmpzip";

/// Whether `path` names a zip archive, judged by its extension
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Extracts `zip_path` into a fresh temporary directory
///
/// The directory is created under `tmp_base` when given, otherwise under the
/// system temp directory, and is removed when the returned guard drops.
///
/// # Errors
///
/// Returns [`DcmvolError::Archive`] if the archive is unreadable, and an I/O
/// error if the directory cannot be created
pub fn extract_archive(zip_path: &Path, tmp_base: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(EXTRACT_PREFIX);
    let temp_dir = match tmp_base {
        Some(base) => builder.tempdir_in(base)?,
        None => builder.tempdir()?,
    };

    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| DcmvolError::Archive(format!("{}: {}", zip_path.display(), e)))?;
    archive.extract(temp_dir.path())?;

    info!(
        "Extracted {} entries from {} to {}",
        archive.len(),
        zip_path.display(),
        temp_dir.path().display()
    );
    Ok(temp_dir)
}
