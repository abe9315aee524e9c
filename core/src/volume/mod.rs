//! Reconstruction of a sorted series into a volume file

mod geometry;
pub mod header;
mod nifti;

pub use geometry::SliceGeometry;
pub use header::NiftiHeader;
pub use nifti::NiftiWriter;

use crate::dispatch::ReconstructionPlan;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Reads a sorted file list and writes one volume
///
/// Implementations receive the files in slice order. The plan's voxel type
/// and compression flag are authoritative.
pub trait VolumeWriter {
    /// Reconstructs `file_paths` and writes the result to `output`
    ///
    /// # Errors
    ///
    /// Returns [`DcmvolError::ReconstructionFailed`](crate::DcmvolError::ReconstructionFailed)
    /// when pixel data cannot be assembled, and
    /// [`DcmvolError::WriteFailed`](crate::DcmvolError::WriteFailed) when the
    /// output cannot be stored
    fn reconstruct_and_write(
        &self,
        file_paths: &[PathBuf],
        output: &Path,
        plan: &ReconstructionPlan,
    ) -> Result<()>;
}
