use super::geometry::SliceGeometry;
use super::header::NiftiHeader;
use super::VolumeWriter;
use crate::dispatch::ReconstructionPlan;
use crate::error::{DcmvolError, Result};
use crate::types::VoxelType;
use dicom_object::open_file;
use dicom_pixeldata::{ConvertOptions, DecodedPixelData, ModalityLutOption, PixelDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes series as single-file NIfTI-1 volumes
///
/// Output names ending in `.gz` are gzip streams; the plan's compression
/// flag picks between the default deflate level and stored blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiWriter;

impl NiftiWriter {
    pub fn new() -> Self {
        Self
    }
}

impl VolumeWriter for NiftiWriter {
    fn reconstruct_and_write(
        &self,
        file_paths: &[PathBuf],
        output: &Path,
        plan: &ReconstructionPlan,
    ) -> Result<()> {
        let volume = assemble(file_paths, plan)?;
        debug!(
            "Assembled {}x{}x{} volume ({}) from {} file(s)",
            volume.header.size[0],
            volume.header.size[1],
            volume.header.size[2],
            plan,
            file_paths.len()
        );

        let mut bytes = volume.header.to_bytes()?;
        bytes.extend_from_slice(&volume.data);

        let gzip = output.to_string_lossy().ends_with(".gz");
        if gzip {
            let level = if plan.compress {
                Compression::default()
            } else {
                Compression::none()
            };
            let mut encoder = GzEncoder::new(Vec::new(), level);
            encoder
                .write_all(&bytes)
                .map_err(|e| write_failed(output, e))?;
            bytes = encoder.finish().map_err(|e| write_failed(output, e))?;
        }

        persist(output, &bytes)?;
        info!("Wrote {}", output.display());
        Ok(())
    }
}

/// Header and encoded voxel data of one volume
struct Volume {
    header: NiftiHeader,
    data: Vec<u8>,
}

/// Pixel samples of one file, already encoded as the output voxel type
struct FileSamples {
    rows: u32,
    columns: u32,
    frames: u32,
    samples: u16,
    data: Vec<u8>,
    geometry: SliceGeometry,
}

fn assemble(file_paths: &[PathBuf], plan: &ReconstructionPlan) -> Result<Volume> {
    let mut files = file_paths.iter();
    let first_path = files
        .next()
        .ok_or_else(|| DcmvolError::ReconstructionFailed("series has no files".to_string()))?;

    let first = read_samples(first_path, plan.voxel)?;
    let mut data = first.data;
    let mut planes = first.frames as usize;
    let mut last_geometry = None;

    for path in files {
        let slice = read_samples(path, plan.voxel)?;
        if (slice.rows, slice.columns, slice.samples) != (first.rows, first.columns, first.samples) {
            return Err(failed(
                path,
                format!(
                    "slice is {}x{}x{}, expected {}x{}x{}",
                    slice.columns, slice.rows, slice.samples, first.columns, first.rows, first.samples
                ),
            ));
        }
        data.extend_from_slice(&slice.data);
        planes += slice.frames as usize;
        last_geometry = Some(slice.geometry);
    }

    let vector_length = if plan.voxel.samples() == 1 {
        first.samples.max(1) as usize
    } else {
        1
    };
    if vector_length > 1 {
        data = to_planar(&data, vector_length, plan.voxel.sample_bytes());
    }

    let (spacing, srow) = first.geometry.affine(last_geometry.as_ref(), planes);
    let header = NiftiHeader {
        size: [first.columns as usize, first.rows as usize, planes],
        dimension: plan.dimension,
        vector_length,
        voxel: plan.voxel,
        spacing,
        srow,
    };

    Ok(Volume { header, data })
}

fn read_samples(path: &Path, voxel: VoxelType) -> Result<FileSamples> {
    let obj = open_file(path)?;
    let decoded = obj.decode_pixel_data().map_err(|e| failed(path, e))?;

    Ok(FileSamples {
        rows: decoded.rows(),
        columns: decoded.columns(),
        frames: decoded.number_of_frames(),
        samples: decoded.samples_per_pixel(),
        data: encode_samples(path, &decoded, voxel)?,
        geometry: SliceGeometry::from_dicom(&obj),
    })
}

/// Converts decoded pixels into little-endian samples of `voxel`
///
/// Scalar outputs carry the modality rescale; colour outputs keep the
/// stored bytes. Narrowing casts saturate.
fn encode_samples(path: &Path, decoded: &DecodedPixelData, voxel: VoxelType) -> Result<Vec<u8>> {
    if matches!(voxel, VoxelType::Rgb8 | VoxelType::Rgba8) {
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        return decoded
            .to_vec_with_options::<u8>(&options)
            .map_err(|e| failed(path, e));
    }

    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::Default);
    let values = decoded
        .to_vec_with_options::<f32>(&options)
        .map_err(|e| failed(path, e))?;

    Ok(match voxel {
        VoxelType::UInt8 => values.iter().map(|v| v.round() as u8).collect(),
        VoxelType::Int16 => values
            .iter()
            .flat_map(|v| (v.round() as i16).to_le_bytes())
            .collect(),
        _ => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    })
}

/// Reorders interleaved components into one block per component
fn to_planar(data: &[u8], components: usize, sample_bytes: usize) -> Vec<u8> {
    let stride = components * sample_bytes;
    let voxels = data.len() / stride;
    let mut planar = Vec::with_capacity(data.len());
    for c in 0..components {
        for v in 0..voxels {
            let start = v * stride + c * sample_bytes;
            planar.extend_from_slice(&data[start..start + sample_bytes]);
        }
    }
    planar
}

/// Writes `bytes` next to `output` and renames it into place
fn persist(output: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(output, e))?;
    tmp.write_all(bytes).map_err(|e| write_failed(output, e))?;
    tmp.persist(output).map_err(|e| write_failed(output, e.error))?;
    Ok(())
}

fn failed(path: &Path, reason: impl Display) -> DcmvolError {
    DcmvolError::ReconstructionFailed(format!("{}: {}", path.display(), reason))
}

fn write_failed(path: &Path, reason: impl Display) -> DcmvolError {
    DcmvolError::WriteFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
