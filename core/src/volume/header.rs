use crate::error::{DcmvolError, Result};
use crate::types::VoxelType;

/// Size of a NIfTI-1 header
pub const HEADER_SIZE: usize = 348;

/// Data offset of a single-file NIfTI-1 with an empty extension block
pub const VOX_OFFSET: usize = HEADER_SIZE + 4;

const DT_UINT8: i16 = 2;
const DT_INT16: i16 = 4;
const DT_FLOAT32: i16 = 16;
const DT_RGB24: i16 = 128;
const DT_RGBA32: i16 = 2304;

const INTENT_VECTOR: i16 = 1007;
const NIFTI_XFORM_SCANNER_ANAT: i16 = 1;
const NIFTI_UNITS_MM: u8 = 2;

/// Fields of a NIfTI-1 header that the writer fills in
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Voxel counts along i, j, k
    pub size: [usize; 3],

    /// 2 or 3
    pub dimension: u32,

    /// Components of a vector image, 1 for scalar and colour images
    pub vector_length: usize,

    pub voxel: VoxelType,

    /// Voxel spacing (mm)
    pub spacing: [f64; 3],

    /// Rows of the voxel-to-RAS affine
    pub srow: [[f64; 4]; 3],
}

impl NiftiHeader {
    fn datatype(&self) -> (i16, i16) {
        match self.voxel {
            VoxelType::UInt8 => (DT_UINT8, 8),
            VoxelType::Int16 => (DT_INT16, 16),
            VoxelType::Float32 => (DT_FLOAT32, 32),
            VoxelType::Rgb8 => (DT_RGB24, 24),
            VoxelType::Rgba8 => (DT_RGBA32, 32),
        }
    }

    fn dims(&self) -> Result<[i16; 8]> {
        let [nx, ny, nz] = [dim(self.size[0])?, dim(self.size[1])?, dim(self.size[2])?];
        Ok(if self.vector_length > 1 {
            // Vector components live on the 5th axis
            [5, nx, ny, nz, 1, dim(self.vector_length)?, 1, 1]
        } else if self.dimension == 2 {
            [2, nx, ny, 1, 1, 1, 1, 1]
        } else {
            [3, nx, ny, nz, 1, 1, 1, 1]
        })
    }

    /// Encodes the header as little-endian bytes, followed by an empty
    /// extension block
    ///
    /// # Errors
    ///
    /// Returns [`DcmvolError::ReconstructionFailed`] if an extent does not
    /// fit the 16-bit dim field
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = [0u8; HEADER_SIZE];

        header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

        for (i, d) in self.dims()?.iter().enumerate() {
            let offset = 40 + i * 2;
            header[offset..offset + 2].copy_from_slice(&d.to_le_bytes());
        }

        if self.vector_length > 1 {
            header[68..70].copy_from_slice(&INTENT_VECTOR.to_le_bytes());
        }

        let (datatype, bitpix) = self.datatype();
        header[70..72].copy_from_slice(&datatype.to_le_bytes());
        header[72..74].copy_from_slice(&bitpix.to_le_bytes());

        // pixdim[0] is the qfac; the sform carries the orientation
        let pixdim: [f32; 8] = [
            1.0,
            self.spacing[0] as f32,
            self.spacing[1] as f32,
            self.spacing[2] as f32,
            1.0,
            1.0,
            1.0,
            1.0,
        ];
        for (i, p) in pixdim.iter().enumerate() {
            let offset = 76 + i * 4;
            header[offset..offset + 4].copy_from_slice(&p.to_le_bytes());
        }

        header[108..112].copy_from_slice(&(VOX_OFFSET as f32).to_le_bytes());
        header[112..116].copy_from_slice(&1.0f32.to_le_bytes());
        header[116..120].copy_from_slice(&0.0f32.to_le_bytes());
        header[123] = NIFTI_UNITS_MM;

        let descrip = b"dcmvol";
        header[148..148 + descrip.len()].copy_from_slice(descrip);

        header[254..256].copy_from_slice(&NIFTI_XFORM_SCANNER_ANAT.to_le_bytes());
        for (row, base) in self.srow.iter().zip([280, 296, 312]) {
            for (i, v) in row.iter().enumerate() {
                let offset = base + i * 4;
                header[offset..offset + 4].copy_from_slice(&(*v as f32).to_le_bytes());
            }
        }

        header[344..348].copy_from_slice(b"n+1\0");

        let mut bytes = Vec::with_capacity(VOX_OFFSET);
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&[0u8; 4]);
        Ok(bytes)
    }
}

fn dim(n: usize) -> Result<i16> {
    i16::try_from(n).map_err(|_| {
        DcmvolError::ReconstructionFailed(format!(
            "extent {} exceeds the NIfTI-1 limit of {}",
            n,
            i16::MAX
        ))
    })
}
