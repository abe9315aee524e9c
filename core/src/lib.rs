pub mod api;
pub mod archive;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod extraction;
pub mod series;
pub mod suv;
pub mod types;
pub mod volume;

#[cfg(test)]
mod testing;

pub use api::{ConversionSummary, ConvertConfig, Converter, SeriesFailure, SeriesOutcome};
pub use cli::report::TextReport;
pub use dispatch::{ReconstructionPlan, Rejection};
pub use error::{DcmvolError, Result};
pub use types::*;
pub use volume::{NiftiWriter, VolumeWriter};
