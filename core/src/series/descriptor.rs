use crate::error::{DcmvolError, Result};
use crate::extraction::tags::{
    get_non_empty_string, get_string_value, get_u16_value, parse_decimal, tag_name,
    BITS_ALLOCATED, BITS_STORED, DOUBLE_FLOAT_PIXEL_DATA, FLOAT_PIXEL_DATA, NUMBER_OF_FRAMES,
    PIXEL_DATA, PIXEL_REPRESENTATION, RESCALE_INTERCEPT, RESCALE_SLOPE, SAMPLES_PER_PIXEL,
};
use crate::suv::PET_MODALITY;
use crate::types::ComponentType;
use dicom_object::{InMemDicomObject, OpenFileOptions};
use std::path::{Path, PathBuf};

/// Pixel layout of a series, as seen in its first file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Sample type after the modality rescale transform
    pub component_type: ComponentType,

    /// 2 for a single-frame single-file series, 3 otherwise
    pub dimension: u32,

    /// SamplesPerPixel
    pub channel_count: u16,
}

impl ImageInfo {
    /// Derives the pixel layout from a dataset
    ///
    /// # Arguments
    ///
    /// * `dcm` - First dataset of the series (header is enough)
    /// * `file_count` - Number of files in the series
    ///
    /// # Errors
    ///
    /// Returns an error if RescaleSlope or RescaleIntercept is present but not numeric
    pub fn from_dicom(dcm: &InMemDicomObject, file_count: usize) -> Result<Self> {
        let frames = get_string_value(dcm, NUMBER_OF_FRAMES)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1);
        let dimension = if file_count > 1 || frames > 1 { 3 } else { 2 };

        Ok(Self {
            component_type: rescaled_component_type(dcm)?,
            dimension,
            channel_count: get_u16_value(dcm, SAMPLES_PER_PIXEL).unwrap_or(1),
        })
    }

    /// Reads the header of `path` and derives the pixel layout
    pub fn probe(path: &Path, file_count: usize) -> Result<Self> {
        let dcm = OpenFileOptions::new()
            .read_until(PIXEL_DATA)
            .open_file(path)?;
        Self::from_dicom(&dcm, file_count)
    }
}

/// Storage type of the raw pixel samples
fn stored_component_type(dcm: &InMemDicomObject) -> ComponentType {
    if dcm.element(FLOAT_PIXEL_DATA).is_ok() {
        return ComponentType::Float32;
    }
    if dcm.element(DOUBLE_FLOAT_PIXEL_DATA).is_ok() {
        return ComponentType::Float64;
    }

    match get_u16_value(dcm, BITS_ALLOCATED) {
        Some(bits) => {
            let signed = get_u16_value(dcm, PIXEL_REPRESENTATION) == Some(1);
            ComponentType::from_storage(bits, signed)
        }
        None => ComponentType::Unknown,
    }
}

/// Sample type once RescaleSlope/RescaleIntercept are applied
///
/// Identity rescale keeps the stored type. Non-integral coefficients
/// promote to 64-bit float. Integral coefficients select the smallest
/// integer type holding the rescaled range of BitsStored.
fn rescaled_component_type(dcm: &InMemDicomObject) -> Result<ComponentType> {
    let stored = stored_component_type(dcm);

    let slope = match get_non_empty_string(dcm, RESCALE_SLOPE) {
        Some(text) => parse_decimal(tag_name(RESCALE_SLOPE), &text)?,
        None => 1.0,
    };
    let intercept = match get_non_empty_string(dcm, RESCALE_INTERCEPT) {
        Some(text) => parse_decimal(tag_name(RESCALE_INTERCEPT), &text)?,
        None => 0.0,
    };

    if slope == 1.0 && intercept == 0.0 {
        return Ok(stored);
    }

    let (min, max) = match stored {
        ComponentType::Unknown => return Ok(ComponentType::Unknown),
        ComponentType::Float32 | ComponentType::Float64 => return Ok(ComponentType::Float64),
        _ => stored_range(dcm, stored),
    };

    if slope.fract() != 0.0 || intercept.fract() != 0.0 {
        return Ok(ComponentType::Float64);
    }

    let a = min * slope + intercept;
    let b = max * slope + intercept;
    Ok(ComponentType::smallest_holding(a.min(b), a.max(b)))
}

/// Value range representable with BitsStored bits
fn stored_range(dcm: &InMemDicomObject, stored: ComponentType) -> (f64, f64) {
    let allocated = get_u16_value(dcm, BITS_ALLOCATED).unwrap_or(16);
    let bits = get_u16_value(dcm, BITS_STORED)
        .filter(|b| *b > 0 && *b <= allocated)
        .unwrap_or(allocated) as i32;

    let signed = matches!(
        stored,
        ComponentType::Int8 | ComponentType::Int16 | ComponentType::Int32
    );
    if signed {
        (-(2f64.powi(bits - 1)), 2f64.powi(bits - 1) - 1.0)
    } else {
        (0.0, 2f64.powi(bits) - 1.0)
    }
}

/// One discovered image series
///
/// Constructed once by [`resolve`](super::resolve); never mutated afterwards.
/// The pixel layout is not part of the descriptor: it is read with
/// [`probe`](Self::probe) when the series is converted, so a malformed
/// header only affects its own series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDescriptor {
    /// SeriesInstanceUID
    pub series_uid: String,

    /// SeriesDate, used to keep distinct acquisitions sharing a UID apart
    pub series_date: Option<String>,

    /// Member files in slice order
    pub file_paths: Vec<PathBuf>,

    /// Modality of the first file (empty if absent)
    pub modality: String,

    /// SeriesDescription (0008,103E), if non-empty
    pub description: Option<String>,

    /// SeriesNumber (0020,0011), if non-empty
    pub number: Option<String>,
}

impl SeriesDescriptor {
    /// Whether this is a PET series requiring SUV correction
    pub fn is_pet(&self) -> bool {
        self.modality == PET_MODALITY
    }

    /// Unsanitized name stem: description, else number, else UID
    pub fn name_stem(&self) -> &str {
        self.description
            .as_deref()
            .or(self.number.as_deref())
            .unwrap_or(&self.series_uid)
    }

    /// Reads the pixel layout from the first file
    ///
    /// Reflects the rescale coefficients currently on disk, so a PET series
    /// is probed after its files have been rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the series has no files, the first file cannot be
    /// read, or its rescale coefficients are not numeric
    pub fn probe(&self) -> Result<ImageInfo> {
        let first = self.file_paths.first().ok_or_else(|| {
            DcmvolError::ReconstructionFailed(format!("series {} has no files", self.series_uid))
        })?;
        ImageInfo::probe(first, self.file_paths.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, Tag, VR};

    fn put(dcm: &mut InMemDicomObject, tag: Tag, vr: VR, value: PrimitiveValue) {
        dcm.put(DataElement::new(tag, vr, value));
    }

    fn image_header(bits: u16, bits_stored: u16, signed: bool) -> InMemDicomObject {
        let mut dcm = InMemDicomObject::new_empty();
        put(&mut dcm, SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16));
        put(&mut dcm, BITS_ALLOCATED, VR::US, PrimitiveValue::from(bits));
        put(&mut dcm, BITS_STORED, VR::US, PrimitiveValue::from(bits_stored));
        put(
            &mut dcm,
            PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(u16::from(signed)),
        );
        dcm
    }

    fn with_rescale(mut dcm: InMemDicomObject, slope: &str, intercept: &str) -> InMemDicomObject {
        put(&mut dcm, RESCALE_SLOPE, VR::DS, PrimitiveValue::from(slope));
        put(&mut dcm, RESCALE_INTERCEPT, VR::DS, PrimitiveValue::from(intercept));
        dcm
    }

    #[test]
    fn test_identity_rescale_keeps_storage_type() {
        let dcm = with_rescale(image_header(16, 16, true), "1", "0");
        let info = ImageInfo::from_dicom(&dcm, 10).unwrap();
        assert_eq!(info.component_type, ComponentType::Int16);
        assert_eq!(info.dimension, 3);
        assert_eq!(info.channel_count, 1);
    }

    #[test]
    fn test_ct_intercept_promotes_to_signed() {
        let dcm = with_rescale(image_header(16, 12, false), "1", "-1024");
        let info = ImageInfo::from_dicom(&dcm, 1).unwrap();
        assert_eq!(info.component_type, ComponentType::Int16);
        assert_eq!(info.dimension, 2);
    }

    #[test]
    fn test_fractional_slope_promotes_to_double() {
        let dcm = with_rescale(image_header(16, 16, true), "2.3e-01", "0");
        let info = ImageInfo::from_dicom(&dcm, 40).unwrap();
        assert_eq!(info.component_type, ComponentType::Float64);
    }

    #[test]
    fn test_integral_slope_widens() {
        let dcm = with_rescale(image_header(16, 16, true), "4", "0");
        let info = ImageInfo::from_dicom(&dcm, 2).unwrap();
        assert_eq!(info.component_type, ComponentType::Int32);
    }

    #[test]
    fn test_multiframe_is_three_dimensional() {
        let mut dcm = image_header(8, 8, false);
        put(&mut dcm, NUMBER_OF_FRAMES, VR::IS, PrimitiveValue::from("12"));
        let info = ImageInfo::from_dicom(&dcm, 1).unwrap();
        assert_eq!(info.component_type, ComponentType::UInt8);
        assert_eq!(info.dimension, 3);
    }

    #[test]
    fn test_unknown_bit_depth() {
        let dcm = image_header(1, 1, false);
        let info = ImageInfo::from_dicom(&dcm, 1).unwrap();
        assert_eq!(info.component_type, ComponentType::Unknown);
    }

    #[test]
    fn test_invalid_slope_is_an_error() {
        let dcm = with_rescale(image_header(16, 16, true), "x", "0");
        assert!(ImageInfo::from_dicom(&dcm, 1).is_err());
    }

    #[test]
    fn test_name_stem_priority() {
        let mut series = SeriesDescriptor {
            series_uid: "1.2.3".to_string(),
            series_date: None,
            file_paths: vec![],
            modality: "PT".to_string(),
            description: Some("WB PET".to_string()),
            number: Some("4".to_string()),
        };
        assert!(series.is_pet());
        assert_eq!(series.name_stem(), "WB PET");
        series.description = None;
        assert_eq!(series.name_stem(), "4");
        series.number = None;
        assert_eq!(series.name_stem(), "1.2.3");
    }

    #[test]
    fn test_layout_without_files_fails() {
        let series = SeriesDescriptor {
            series_uid: "1.2.3".to_string(),
            series_date: None,
            file_paths: vec![],
            modality: "CT".to_string(),
            description: None,
            number: None,
        };
        assert!(matches!(
            series.probe(),
            Err(DcmvolError::ReconstructionFailed(_))
        ));
    }
}
