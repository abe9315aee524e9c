use crate::types::ComponentType;
use dicom_core::Tag;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dcmvol operations
pub type Result<T> = std::result::Result<T, DcmvolError>;

/// Error types for dcmvol operations
#[derive(Error, Debug)]
pub enum DcmvolError {
    /// DICOM reading or writing error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Tag absent from the dataset, or present with an empty value
    #[error("DICOM tag not found: ({:04X},{:04X}) {name}", tag.group(), tag.element())]
    TagNotFound { tag: Tag, name: &'static str },

    /// Radiopharmaceutical information sequence does not hold exactly one item
    #[error("Invalid number of items in pharma info: expected 1, found {0}")]
    MalformedPharmaInfo(usize),

    /// Textual tag value could not be parsed as a number
    #[error("Invalid numeric value for {field}: '{value}'")]
    InvalidNumericField { field: &'static str, value: String },

    /// DA/TM value could not be interpreted
    #[error("Invalid date/time value for {field}: '{value}'")]
    InvalidDateTime { field: &'static str, value: String },

    /// Image dimension other than 2 or 3
    #[error("Invalid image dimension: {0}")]
    UnsupportedDimension(u32),

    /// No reconstruction path for this component type
    #[error("Unsupported component type: {component} ({channels} channel(s))")]
    UnsupportedComponentType {
        component: ComponentType,
        channels: u16,
    },

    /// Every disambiguated output name is already taken
    #[error("Could not find available filename for '{stem}' in {}", dir.display())]
    NoAvailableName { dir: PathBuf, stem: String },

    /// Pixel data could not be decoded or assembled into a volume
    #[error("Reconstruction failed: {0}")]
    ReconstructionFailed(String),

    /// Output volume could not be written
    #[error("Failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// Input path does not exist
    #[error("Could not find input ({})", .0.display())]
    InputNotFound(PathBuf),

    /// Output directory does not exist
    #[error("Could not find outdir ({})", .0.display())]
    OutputDirNotFound(PathBuf),

    /// Zip archive could not be opened or extracted
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for DcmvolError {
    fn from(e: dicom_object::ReadError) -> Self {
        DcmvolError::DicomError(format!("{}", e))
    }
}

impl From<dicom_object::WriteError> for DcmvolError {
    fn from(e: dicom_object::WriteError) -> Self {
        DcmvolError::DicomError(format!("{}", e))
    }
}

impl From<zip::result::ZipError> for DcmvolError {
    fn from(e: zip::result::ZipError) -> Self {
        DcmvolError::Archive(format!("{}", e))
    }
}
