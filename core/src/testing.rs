//! Synthetic DICOM fixtures for unit tests

use crate::extraction::tags::*;
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::uids;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::path::Path;

const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);

/// Radiopharmaceutical and acquisition attributes of a PET slice
#[derive(Debug, Clone)]
pub struct PetSpec {
    pub weight: String,
    pub dose: String,
    pub half_life: String,
    pub start_time: String,
    pub series_time: String,
    pub units: String,
}

impl Default for PetSpec {
    /// F-18 FDG, 370 MBq injected one hour before a 70 kg acquisition
    fn default() -> Self {
        Self {
            weight: "70".to_string(),
            dose: "370000000".to_string(),
            half_life: "6586.2".to_string(),
            start_time: "090000".to_string(),
            series_time: "100000".to_string(),
            units: "BQML".to_string(),
        }
    }
}

/// Description of a single-frame slice
///
/// Slices hold signed 16-bit MONOCHROME2 pixels unless `samples` is set,
/// in which case they hold interleaved unsigned 8-bit samples.
#[derive(Debug, Clone)]
pub struct SliceSpec {
    pub uid: String,
    pub date: String,
    pub modality: String,
    pub description: Option<String>,
    pub number: Option<String>,
    pub instance: Option<i32>,
    pub z: Option<f64>,
    pub rows: u16,
    pub columns: u16,
    pub pixels: Vec<i16>,
    pub samples: Option<(u16, Vec<u8>)>,
    pub slope: String,
    pub intercept: String,
    pub pet: Option<PetSpec>,
}

impl SliceSpec {
    pub fn ct(uid: &str, date: &str) -> Self {
        Self {
            uid: uid.to_string(),
            date: date.to_string(),
            modality: "CT".to_string(),
            description: None,
            number: None,
            instance: None,
            z: None,
            rows: 2,
            columns: 3,
            pixels: (0..6).collect(),
            samples: None,
            slope: "1".to_string(),
            intercept: "0".to_string(),
            pet: None,
        }
    }

    pub fn pet(uid: &str, date: &str) -> Self {
        Self {
            modality: "PT".to_string(),
            pet: Some(PetSpec::default()),
            ..Self::ct(uid, date)
        }
    }

    pub fn with_position(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_number(mut self, number: &str) -> Self {
        self.number = Some(number.to_string());
        self
    }

    pub fn with_instance(mut self, instance: i32) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn with_pixels(mut self, pixels: Vec<i16>) -> Self {
        self.pixels = pixels;
        self
    }

    pub fn with_size(mut self, rows: u16, columns: u16) -> Self {
        self.rows = rows;
        self.columns = columns;
        self.pixels = vec![0; rows as usize * columns as usize];
        self
    }

    pub fn with_samples(mut self, per_pixel: u16, bytes: Vec<u8>) -> Self {
        self.samples = Some((per_pixel, bytes));
        self
    }

    pub fn with_rescale(mut self, slope: &str, intercept: &str) -> Self {
        self.slope = slope.to_string();
        self.intercept = intercept.to_string();
        self
    }

    pub fn with_pet(mut self, pet: PetSpec) -> Self {
        self.pet = Some(pet);
        self
    }

    fn sop_class(&self) -> &'static str {
        if self.pet.is_some() {
            uids::POSITRON_EMISSION_TOMOGRAPHY_IMAGE_STORAGE
        } else {
            uids::CT_IMAGE_STORAGE
        }
    }
}

pub fn put_str(dcm: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    dcm.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

fn put_u16(dcm: &mut InMemDicomObject, tag: Tag, value: u16) {
    dcm.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

/// Builds the dataset described by `spec`
pub fn build_dataset(spec: &SliceSpec, instance_uid: &str) -> InMemDicomObject {
    let mut dcm = InMemDicomObject::new_empty();

    put_str(&mut dcm, SOP_CLASS_UID, VR::UI, spec.sop_class());
    put_str(&mut dcm, SOP_INSTANCE_UID, VR::UI, instance_uid);
    put_str(&mut dcm, MODALITY, VR::CS, &spec.modality);
    put_str(&mut dcm, SERIES_INSTANCE_UID, VR::UI, &spec.uid);
    put_str(&mut dcm, SERIES_DATE, VR::DA, &spec.date);
    if let Some(description) = &spec.description {
        put_str(&mut dcm, SERIES_DESCRIPTION, VR::LO, description);
    }
    if let Some(number) = &spec.number {
        put_str(&mut dcm, SERIES_NUMBER, VR::IS, number);
    }
    if let Some(instance) = spec.instance {
        put_str(&mut dcm, INSTANCE_NUMBER, VR::IS, &instance.to_string());
    }

    if let Some(z) = spec.z {
        put_str(
            &mut dcm,
            IMAGE_POSITION_PATIENT,
            VR::DS,
            &format!("-100\\-120\\{}", z),
        );
        put_str(&mut dcm, IMAGE_ORIENTATION_PATIENT, VR::DS, "1\\0\\0\\0\\1\\0");
    }
    put_str(&mut dcm, PIXEL_SPACING, VR::DS, "0.8\\0.6");
    put_str(&mut dcm, SLICE_THICKNESS, VR::DS, "2");

    match &spec.samples {
        Some((per_pixel, _)) => {
            let photometric = match per_pixel {
                3 => "RGB",
                4 => "ARGB",
                _ => "MONOCHROME2",
            };
            put_u16(&mut dcm, SAMPLES_PER_PIXEL, *per_pixel);
            put_str(&mut dcm, PHOTOMETRIC_INTERPRETATION, VR::CS, photometric);
            put_u16(&mut dcm, PLANAR_CONFIGURATION, 0);
            put_u16(&mut dcm, BITS_ALLOCATED, 8);
            put_u16(&mut dcm, BITS_STORED, 8);
            put_u16(&mut dcm, HIGH_BIT, 7);
            put_u16(&mut dcm, PIXEL_REPRESENTATION, 0);
        }
        None => {
            put_u16(&mut dcm, SAMPLES_PER_PIXEL, 1);
            put_str(&mut dcm, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
            put_u16(&mut dcm, BITS_ALLOCATED, 16);
            put_u16(&mut dcm, BITS_STORED, 16);
            put_u16(&mut dcm, HIGH_BIT, 15);
            put_u16(&mut dcm, PIXEL_REPRESENTATION, 1);
        }
    }
    put_u16(&mut dcm, ROWS, spec.rows);
    put_u16(&mut dcm, COLUMNS, spec.columns);
    put_str(&mut dcm, RESCALE_INTERCEPT, VR::DS, &spec.intercept);
    put_str(&mut dcm, RESCALE_SLOPE, VR::DS, &spec.slope);

    if let Some(pet) = &spec.pet {
        put_str(&mut dcm, SERIES_TIME, VR::TM, &pet.series_time);
        put_str(&mut dcm, PATIENT_WEIGHT, VR::DS, &pet.weight);
        put_str(&mut dcm, UNITS, VR::CS, &pet.units);

        let mut item = InMemDicomObject::new_empty();
        put_str(&mut item, RADIOPHARMACEUTICAL_START_TIME, VR::TM, &pet.start_time);
        put_str(&mut item, RADIONUCLIDE_TOTAL_DOSE, VR::DS, &pet.dose);
        put_str(&mut item, RADIONUCLIDE_HALF_LIFE, VR::DS, &pet.half_life);
        dcm.put(DataElement::new(
            RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![item]),
        ));
    }

    match &spec.samples {
        Some((_, bytes)) => {
            dcm.put(DataElement::new(PIXEL_DATA, VR::OB, PrimitiveValue::from(bytes.clone())));
        }
        None => {
            let bytes: Vec<u8> = spec.pixels.iter().flat_map(|p| p.to_le_bytes()).collect();
            dcm.put(DataElement::new(PIXEL_DATA, VR::OW, PrimitiveValue::from(bytes)));
        }
    }

    dcm
}

/// Writes the slice described by `spec` as an Explicit VR Little Endian file
pub fn write_dicom(path: &Path, spec: &SliceSpec) {
    let instance_uid = format!("{}.{}", spec.uid, spec.z.unwrap_or(0.0).abs() as u32 + 1);
    build_dataset(spec, &instance_uid)
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(spec.sop_class())
                .media_storage_sop_instance_uid(&instance_uid),
        )
        .unwrap()
        .write_to_file(path)
        .unwrap();
}
