//! Rescale-slope re-encoding under the Decimal String length limit
//!
//! RescaleSlope (0028,1053) is a DS element: at most 16 bytes of text.
//! The scaled slope is rendered in scientific notation with the highest
//! precision that fits.

use crate::error::Result;
use crate::extraction::tags::{require_f64, RESCALE_INTERCEPT, RESCALE_SLOPE};
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_object::InMemDicomObject;
use log::{debug, warn};

/// Maximum length of a Decimal String value, in bytes
pub const DS_MAX_LEN: usize = 16;

/// Highest precision tried (digits after the decimal point)
pub const MAX_PRECISION: usize = 10;

/// Renders `value` as `d.ddd…e±XX` with `precision` fractional digits
///
/// The exponent always carries a sign and at least two digits, matching
/// C `%e` output. Non-finite values use their default rendering.
pub fn format_scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = format!("{:.*e}", precision, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}

/// Encodes `value` for a DS element
///
/// Tries precisions from [`MAX_PRECISION`] down to 1 and returns the first
/// rendering of at most [`DS_MAX_LEN`] bytes. When none fits, falls back to
/// the plain fixed-point rendering, which may exceed the limit; a warning is
/// logged in that case.
pub fn encode_decimal_string(value: f64) -> String {
    for precision in (1..=MAX_PRECISION).rev() {
        let candidate = format_scientific(value, precision);
        if candidate.len() <= DS_MAX_LEN {
            return candidate;
        }
    }

    let fallback = format!("{:.6}", value);
    warn!(
        "Could not fit {} into {} bytes; writing unconstrained value '{}' ({} bytes)",
        value,
        DS_MAX_LEN,
        fallback,
        fallback.len()
    );
    fallback
}

/// Multiplies the dataset's RescaleSlope by `scale_factor` in place
///
/// RescaleIntercept must parse but is left untouched. The new slope is
/// fully encoded before the element is replaced.
///
/// # Returns
///
/// The encoded slope string written to the dataset
///
/// # Errors
///
/// Returns an error if RescaleSlope or RescaleIntercept is missing or not numeric
pub fn rescale_slope(dcm: &mut InMemDicomObject, scale_factor: f64) -> Result<String> {
    let intercept = require_f64(dcm, RESCALE_INTERCEPT)?;
    let slope = require_f64(dcm, RESCALE_SLOPE)?;
    let scaled_slope = scale_factor * slope;
    let encoded = encode_decimal_string(scaled_slope);

    debug!(
        "RescaleSlope {} -> {} (intercept {}, factor {})",
        slope, encoded, intercept, scale_factor
    );

    dcm.put(DataElement::new(
        RESCALE_SLOPE,
        VR::DS,
        PrimitiveValue::from(encoded.as_str()),
    ));
    Ok(encoded)
}
