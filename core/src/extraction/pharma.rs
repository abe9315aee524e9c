use crate::error::{DcmvolError, Result};
use crate::types::datetime::{parse_date, parse_time};
use chrono::{NaiveDate, NaiveTime};
use dicom_object::InMemDicomObject;

use super::tags::{
    require_f64, require_string, tag_name, PATIENT_WEIGHT, RADIONUCLIDE_HALF_LIFE,
    RADIONUCLIDE_TOTAL_DOSE, RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
    RADIOPHARMACEUTICAL_START_TIME, SERIES_DATE, SERIES_TIME,
};

/// Injected dose information from the radiopharmaceutical information sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiopharmaceuticalDose {
    /// Total injected dose (Bq)
    pub dose_becquerels: f64,

    /// Radionuclide half-life (s)
    pub half_life_seconds: f64,

    /// Injection time of day; shares the series date
    pub injection_time: NaiveTime,
}

impl RadiopharmaceuticalDose {
    /// Extracts dose information from the single item of
    /// RadiopharmaceuticalInformationSequence (0054,0016)
    ///
    /// # Errors
    ///
    /// - [`DcmvolError::TagNotFound`] if the sequence or any item field is missing
    /// - [`DcmvolError::MalformedPharmaInfo`] if the sequence does not hold exactly one item
    /// - [`DcmvolError::InvalidNumericField`] / [`DcmvolError::InvalidDateTime`] on unparsable values
    pub fn from_dicom(dcm: &InMemDicomObject) -> Result<Self> {
        let element = dcm
            .element(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE)
            .map_err(|_| DcmvolError::TagNotFound {
                tag: RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
                name: tag_name(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE),
            })?;

        let item = match element.items() {
            Some([item]) => item,
            Some(items) => return Err(DcmvolError::MalformedPharmaInfo(items.len())),
            None => return Err(DcmvolError::MalformedPharmaInfo(0)),
        };

        let dose_becquerels = require_f64(item, RADIONUCLIDE_TOTAL_DOSE)?;
        let half_life_seconds = require_f64(item, RADIONUCLIDE_HALF_LIFE)?;
        if half_life_seconds <= 0.0 {
            return Err(DcmvolError::InvalidNumericField {
                field: tag_name(RADIONUCLIDE_HALF_LIFE),
                value: half_life_seconds.to_string(),
            });
        }
        let injection_time = parse_time(
            tag_name(RADIOPHARMACEUTICAL_START_TIME),
            &require_string(item, RADIOPHARMACEUTICAL_START_TIME)?,
        )?;

        Ok(Self {
            dose_becquerels,
            half_life_seconds,
            injection_time,
        })
    }
}

/// Acquisition timing and patient weight read from the top-level dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionContext {
    pub series_date: NaiveDate,
    pub series_time: NaiveTime,
    pub patient_weight_kg: f64,
}

impl AcquisitionContext {
    /// Extracts SeriesDate, SeriesTime and PatientWeight
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three tags is missing or malformed
    pub fn from_dicom(dcm: &InMemDicomObject) -> Result<Self> {
        let series_date = parse_date(tag_name(SERIES_DATE), &require_string(dcm, SERIES_DATE)?)?;
        let series_time = parse_time(tag_name(SERIES_TIME), &require_string(dcm, SERIES_TIME)?)?;
        let patient_weight_kg = require_f64(dcm, PATIENT_WEIGHT)?;

        Ok(Self {
            series_date,
            series_time,
            patient_weight_kg,
        })
    }
}
