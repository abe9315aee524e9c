use super::descriptor::SeriesDescriptor;
use crate::error::{DcmvolError, Result};
use std::path::{Path, PathBuf};

/// Upper bound on `_(<i>)` disambiguation attempts
pub const MAX_NAME_ATTEMPTS: usize = 10000;

/// Compound extension kept whole when splitting an output name
const NIFTI_GZ: &str = ".nii.gz";

/// Characters that cannot appear in a portable file name
#[cfg(not(windows))]
const RESERVED_CHARS: &[char] = &['/', ':', '*', '"', '?', '<', '>', '|'];
#[cfg(windows)]
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '"', '?', '<', '>', '|'];

/// Replaces reserved characters with spaces and strips trailing whitespace
pub fn sanitize_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Splits an output path into (directory, stem, extension)
///
/// A trailing `.nii.gz` is treated as a single extension.
pub fn split_output_name(path: &Path) -> (PathBuf, String, String) {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(stem) = file_name.strip_suffix(NIFTI_GZ) {
        return (dir, stem.to_string(), NIFTI_GZ.to_string());
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (dir, stem, ext)
}

/// Finds the first `<dir>/<stem>_(<i>)<ext>` that does not exist
///
/// The check is a point-in-time test; nothing is reserved on disk.
///
/// # Errors
///
/// Returns [`DcmvolError::NoAvailableName`] if all [`MAX_NAME_ATTEMPTS`]
/// candidates exist
pub fn available_name(dir: &Path, stem: &str, ext: &str) -> Result<PathBuf> {
    (0..MAX_NAME_ATTEMPTS)
        .map(|i| dir.join(format!("{}_({}){}", stem, i, ext)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| DcmvolError::NoAvailableName {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
        })
}

/// Derives output paths for successive series
///
/// # Example
///
/// ```
/// use dcmvol_core::series::OutputNamer;
/// use std::path::{Path, PathBuf};
///
/// let namer = OutputNamer::new(Some(PathBuf::from("out/scan.nii.gz")), "out", ".nii.gz");
/// assert_eq!(namer.explicit_name(1), Some(PathBuf::from("out/scan.nii.gz")));
/// assert_eq!(namer.explicit_name(3), Some(Path::new("out").join("scan_(3).nii.gz")));
/// ```
#[derive(Debug, Clone)]
pub struct OutputNamer {
    explicit: Option<PathBuf>,
    outdir: PathBuf,
    ext: String,
}

impl OutputNamer {
    /// Creates a namer
    ///
    /// # Arguments
    ///
    /// * `explicit` - Caller-supplied output file, if any
    /// * `outdir` - Directory for derived names
    /// * `ext` - Extension appended to derived names (e.g. `.nii.gz`)
    pub fn new(explicit: Option<PathBuf>, outdir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            explicit,
            outdir: outdir.into(),
            ext: ext.into(),
        }
    }

    /// Name derived from the caller-supplied output for the `ordinal`-th series (1-based)
    pub fn explicit_name(&self, ordinal: usize) -> Option<PathBuf> {
        let explicit = self.explicit.as_ref()?;
        if ordinal <= 1 {
            return Some(explicit.clone());
        }
        let (dir, stem, ext) = split_output_name(explicit);
        Some(dir.join(format!("{}_({}){}", stem, ordinal, ext)))
    }

    /// Output path for the `ordinal`-th series (1-based)
    ///
    /// A caller-supplied name wins. Otherwise the stem comes from the
    /// series description, number or UID, is sanitized, and gets a
    /// `_(<i>)` suffix if the plain name is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`DcmvolError::NoAvailableName`] when no free name remains
    pub fn output_path(&self, ordinal: usize, series: &SeriesDescriptor) -> Result<PathBuf> {
        if let Some(path) = self.explicit_name(ordinal) {
            return Ok(path);
        }

        let mut stem = sanitize_stem(series.name_stem());
        if stem.is_empty() {
            stem = sanitize_stem(&series.series_uid);
        }

        let candidate = self.outdir.join(format!("{}{}", stem, self.ext));
        if candidate.exists() {
            available_name(&self.outdir, &stem, &self.ext)
        } else {
            Ok(candidate)
        }
    }
}
