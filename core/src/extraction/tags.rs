use crate::error::{DcmvolError, Result};
use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Identification Tags
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Acquisition Timing Tags
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);

// Patient Tags
pub const PATIENT_WEIGHT: Tag = Tag(0x0010, 0x1030);

// Radiopharmaceutical Tags
pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
pub const RADIOPHARMACEUTICAL_START_TIME: Tag = Tag(0x0018, 0x1072);
pub const RADIONUCLIDE_TOTAL_DOSE: Tag = Tag(0x0018, 0x1074);
pub const RADIONUCLIDE_HALF_LIFE: Tag = Tag(0x0018, 0x1075);
pub const UNITS: Tag = Tag(0x0054, 0x1001);

// Pixel Transform Tags
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);

// Image Pixel Tags
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0008);
pub const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0009);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Image Plane Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);

/// Keyword for every tag this crate reads or writes, for error messages
pub const TAG_NAMES: &[(Tag, &str)] = &[
    (MODALITY, "Modality"),
    (SERIES_INSTANCE_UID, "SeriesInstanceUID"),
    (SERIES_DESCRIPTION, "SeriesDescription"),
    (SERIES_NUMBER, "SeriesNumber"),
    (INSTANCE_NUMBER, "InstanceNumber"),
    (SERIES_DATE, "SeriesDate"),
    (SERIES_TIME, "SeriesTime"),
    (PATIENT_WEIGHT, "PatientWeight"),
    (
        RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
        "RadiopharmaceuticalInformationSequence",
    ),
    (RADIOPHARMACEUTICAL_START_TIME, "RadiopharmaceuticalStartTime"),
    (RADIONUCLIDE_TOTAL_DOSE, "RadionuclideTotalDose"),
    (RADIONUCLIDE_HALF_LIFE, "RadionuclideHalfLife"),
    (UNITS, "Units"),
    (RESCALE_INTERCEPT, "RescaleIntercept"),
    (RESCALE_SLOPE, "RescaleSlope"),
    (SAMPLES_PER_PIXEL, "SamplesPerPixel"),
    (NUMBER_OF_FRAMES, "NumberOfFrames"),
    (ROWS, "Rows"),
    (COLUMNS, "Columns"),
    (BITS_ALLOCATED, "BitsAllocated"),
    (BITS_STORED, "BitsStored"),
    (PIXEL_REPRESENTATION, "PixelRepresentation"),
    (PIXEL_DATA, "PixelData"),
    (IMAGE_POSITION_PATIENT, "ImagePositionPatient"),
    (IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient"),
    (PIXEL_SPACING, "PixelSpacing"),
];

/// Looks up the keyword of a known tag
pub fn tag_name(tag: Tag) -> &'static str {
    TAG_NAMES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Helper to get a non-empty string value from DICOM tag
///
/// Returns `None` if the tag is absent, unreadable as text, or blank
pub fn get_non_empty_string(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    get_string_value(dcm, tag).filter(|s| !s.is_empty())
}

/// Reads the textual value of a required tag
///
/// # Errors
///
/// Returns [`DcmvolError::TagNotFound`] when the element is absent or its
/// value is empty
pub fn require_string(dcm: &InMemDicomObject, tag: Tag) -> Result<String> {
    get_non_empty_string(dcm, tag).ok_or(DcmvolError::TagNotFound {
        tag,
        name: tag_name(tag),
    })
}

/// Reads a required tag and parses it as a floating-point number
///
/// Multi-valued strings contribute their first value.
///
/// # Errors
///
/// Returns [`DcmvolError::TagNotFound`] if the element is absent or empty,
/// or [`DcmvolError::InvalidNumericField`] if it is not numeric
pub fn require_f64(dcm: &InMemDicomObject, tag: Tag) -> Result<f64> {
    let text = require_string(dcm, tag)?;
    parse_decimal(tag_name(tag), &text)
}

/// Parses a decimal-string value (first value of a multi-valued DS)
pub fn parse_decimal(field: &'static str, text: &str) -> Result<f64> {
    let first = text.split('\\').next().unwrap_or("").trim();
    first
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DcmvolError::InvalidNumericField {
            field,
            value: text.to_string(),
        })
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get multi-valued floating-point value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted
pub fn get_multi_f64_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    fn dataset_with(tag: Tag, vr: VR, value: &str) -> InMemDicomObject {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
        dcm
    }

    #[test]
    fn test_tag_values() {
        assert_eq!(RESCALE_SLOPE, Tag(0x0028, 0x1053));
        assert_eq!(RADIONUCLIDE_HALF_LIFE, Tag(0x0018, 0x1075));
        assert_eq!(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, Tag(0x0054, 0x0016));
        assert_eq!(tag_name(PATIENT_WEIGHT), "PatientWeight");
        assert_eq!(tag_name(Tag(0x0009, 0x0001)), "Unknown");
    }

    #[test]
    fn test_require_string_absent() {
        let dcm = InMemDicomObject::new_empty();
        let err = require_string(&dcm, RADIONUCLIDE_TOTAL_DOSE).unwrap_err();
        assert!(matches!(
            err,
            DcmvolError::TagNotFound {
                name: "RadionuclideTotalDose",
                ..
            }
        ));
    }

    #[test]
    fn test_require_string_empty_is_absent() {
        let dcm = dataset_with(RADIONUCLIDE_HALF_LIFE, VR::DS, "  ");
        assert!(matches!(
            require_string(&dcm, RADIONUCLIDE_HALF_LIFE),
            Err(DcmvolError::TagNotFound { .. })
        ));
        // Optional lookups still see the element as present
        assert_eq!(get_string_value(&dcm, RADIONUCLIDE_HALF_LIFE), Some(String::new()));
    }

    #[test]
    fn test_require_f64() {
        let dcm = dataset_with(RADIONUCLIDE_TOTAL_DOSE, VR::DS, "3.7e8 ");
        assert_eq!(require_f64(&dcm, RADIONUCLIDE_TOTAL_DOSE).unwrap(), 3.7e8);
    }

    #[test]
    fn test_require_f64_invalid() {
        let dcm = dataset_with(PATIENT_WEIGHT, VR::DS, "seventy");
        assert!(matches!(
            require_f64(&dcm, PATIENT_WEIGHT),
            Err(DcmvolError::InvalidNumericField {
                field: "PatientWeight",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_decimal_multi_valued() {
        assert_eq!(parse_decimal("PixelSpacing", "0.5\\0.7").unwrap(), 0.5);
        assert!(parse_decimal("RescaleSlope", "nan").is_err());
    }
}
