use crate::error::Result;
use crate::extraction::{AcquisitionContext, RadiopharmaceuticalDose};
use crate::types::datetime::to_timestamp;
use crate::types::TimeBasis;
use dicom_object::InMemDicomObject;
use log::{debug, warn};

/// Body-weight SUV scale factor for a given elapsed decay time
///
/// `SUVbw = weight_kg * 1000 / (dose * 2^(-decay_seconds / half_life_seconds))`
///
/// Negative decay times are accepted and use the same formula.
pub fn suv_bw_scale_factor(
    weight_kg: f64,
    dose_becquerels: f64,
    half_life_seconds: f64,
    decay_seconds: f64,
) -> f64 {
    weight_kg * 1000.0 / decayed_dose(dose_becquerels, half_life_seconds, decay_seconds)
}

/// Activity remaining after `decay_seconds` of radioactive decay
pub fn decayed_dose(dose_becquerels: f64, half_life_seconds: f64, decay_seconds: f64) -> f64 {
    if decay_seconds == 0.0 {
        return dose_becquerels;
    }
    dose_becquerels * 2f64.powf(-decay_seconds / half_life_seconds)
}

/// Series start and injection instants, in seconds since the epoch
///
/// Both instants are built on the series date, since the injection time
/// carries no date of its own.
fn instants(
    dose: &RadiopharmaceuticalDose,
    acquisition: &AcquisitionContext,
    basis: TimeBasis,
) -> (i64, i64) {
    (
        to_timestamp(acquisition.series_date, acquisition.series_time, basis),
        to_timestamp(acquisition.series_date, dose.injection_time, basis),
    )
}

/// Signed seconds elapsed between injection and series start
pub fn decay_seconds(
    dose: &RadiopharmaceuticalDose,
    acquisition: &AcquisitionContext,
    basis: TimeBasis,
) -> i64 {
    let (series_datetime, injection_datetime) = instants(dose, acquisition, basis);
    series_datetime - injection_datetime
}

/// Computes the decay-corrected SUVbw scale factor
pub fn compute(
    dose: &RadiopharmaceuticalDose,
    acquisition: &AcquisitionContext,
    basis: TimeBasis,
) -> f64 {
    let (series_datetime, injection_datetime) = instants(dose, acquisition, basis);
    let decay = series_datetime - injection_datetime;
    if decay < 0 {
        warn!(
            "Series time {} precedes injection time {} ({} s); clocks may be inconsistent",
            acquisition.series_time, dose.injection_time, decay
        );
    }

    let factor = suv_bw_scale_factor(
        acquisition.patient_weight_kg,
        dose.dose_becquerels,
        dose.half_life_seconds,
        decay as f64,
    );

    debug!("weight, {}", acquisition.patient_weight_kg);
    debug!("dose, {}", dose.dose_becquerels);
    debug!("halflife, {}", dose.half_life_seconds);
    debug!("seriesdate, {}", acquisition.series_date);
    debug!("seriestime, {}", acquisition.series_time);
    debug!("pharma_starttime, {}", dose.injection_time);
    debug!("scan datetime, {}", series_datetime);
    debug!("pharma datetime, {}", injection_datetime);
    debug!("decay time, {}", decay);
    debug!(
        "decayed dose, {}",
        decayed_dose(dose.dose_becquerels, dose.half_life_seconds, decay as f64)
    );
    debug!("SUVbwScaleFactor, {}", factor);

    factor
}

/// Reads dose and acquisition metadata from a PET dataset and computes its
/// SUVbw scale factor
///
/// # Errors
///
/// Propagates extraction errors for missing or malformed metadata
pub fn calculate_bw_factor(dcm: &InMemDicomObject, basis: TimeBasis) -> Result<f64> {
    let dose = RadiopharmaceuticalDose::from_dicom(dcm)?;
    let acquisition = AcquisitionContext::from_dicom(dcm)?;
    Ok(compute(&dose, &acquisition, basis))
}
