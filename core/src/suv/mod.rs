//! PET Standardized Uptake Value correction
//!
//! Every slice of a PET series has its RescaleSlope multiplied by the
//! body-weight SUV scale factor, so that reconstructed voxels are in SUV
//! units. The whole series is rewritten before any pixel data is read.

pub mod factor;
pub mod slope;

pub use factor::{calculate_bw_factor, suv_bw_scale_factor};
pub use slope::{encode_decimal_string, rescale_slope};

use crate::error::Result;
use crate::extraction::tags::{get_string_value, UNITS};
use crate::types::TimeBasis;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_object::open_file;
use log::{info, warn};
use std::path::PathBuf;

/// Modality code of positron emission tomography
pub const PET_MODALITY: &str = "PT";

/// Units code of SUV body weight (g/ml)
pub const SUV_UNITS: &str = "GML";

/// Rewrites every file of a PET series with SUV-scaled RescaleSlope
///
/// Files whose Units already read `GML` are left as they are. The scale
/// factor is recomputed per file. Processing stops at the first failing file.
///
/// # Returns
///
/// Number of files rewritten
pub fn rescale_series(file_paths: &[PathBuf], basis: TimeBasis) -> Result<usize> {
    let mut rewritten = 0;

    for path in file_paths {
        let mut dcm = open_file(path)?;

        if get_string_value(&dcm, UNITS).as_deref() == Some(SUV_UNITS) {
            warn!("{} is already in SUV units; skipping", path.display());
            continue;
        }

        let factor = calculate_bw_factor(&dcm, basis)?;
        rescale_slope(&mut dcm, factor)?;
        dcm.put(DataElement::new(UNITS, VR::CS, PrimitiveValue::from(SUV_UNITS)));
        dcm.write_to_file(path)?;
        rewritten += 1;
    }

    info!("Applied SUV scaling to {} file(s)", rewritten);
    Ok(rewritten)
}
