//! Series discovery and output naming
//!
//! A directory tree of DICOM files is grouped into [`SeriesDescriptor`]s,
//! one per (SeriesInstanceUID, SeriesDate) pair, each carrying the pixel
//! layout of its first file. [`OutputNamer`] then derives a unique output
//! path for every series.

mod descriptor;
mod enumerate;
mod naming;

pub use descriptor::{ImageInfo, SeriesDescriptor};
pub use enumerate::resolve;
pub use naming::{
    available_name, sanitize_stem, split_output_name, OutputNamer, MAX_NAME_ATTEMPTS,
};

pub(crate) use enumerate::{cross, dot};
