//! Selection of the reconstruction path for a series
//!
//! Maps a discovered (component type, dimension, channel count) triple to
//! the voxel type written out and the effective compression flag.
//!
//! Scalar promotion table:
//!
//! | discovered | written | compression |
//! |---|---|---|
//! | uint8 | uint8 | requested |
//! | int16 | int16 | requested |
//! | int32 | int16 | requested |
//! | float32 | float32 | off |
//! | float64 | float32 | off |
//!
//! RGB and RGBA are accepted for uint8 samples only.

use crate::error::DcmvolError;
use crate::series::ImageInfo;
use crate::types::{ComponentType, VoxelType};
use log::warn;
use std::fmt;

/// How a series is reconstructed and written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructionPlan {
    /// Voxel type of the output volume
    pub voxel: VoxelType,

    /// 2 or 3
    pub dimension: u32,

    /// Samples per pixel carried into the output
    pub channels: u16,

    /// Whether the output stream is compressed
    pub compress: bool,
}

impl fmt::Display for ReconstructionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}D {}{}",
            self.dimension,
            self.voxel,
            if self.compress { ", compressed" } else { "" }
        )
    }
}

/// Reason a triple has no reconstruction path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedDimension(u32),
    UnsupportedComponentType {
        component: ComponentType,
        channels: u16,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnsupportedDimension(d) => write!(f, "unsupported dimension {}", d),
            Rejection::UnsupportedComponentType {
                component,
                channels,
            } => write!(
                f,
                "unsupported component type {} with {} channel(s)",
                component, channels
            ),
        }
    }
}

impl From<Rejection> for DcmvolError {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::UnsupportedDimension(d) => DcmvolError::UnsupportedDimension(d),
            Rejection::UnsupportedComponentType {
                component,
                channels,
            } => DcmvolError::UnsupportedComponentType {
                component,
                channels,
            },
        }
    }
}

/// Selects the reconstruction plan for a discovered pixel layout
///
/// Channel counts other than 1, 3 or 4 are reported but not rejected;
/// such series follow the scalar table and are written as vector images.
/// Floating-point sources are always written uncompressed, whatever
/// `requested_compress` says.
///
/// # Example
///
/// ```
/// use dcmvol_core::dispatch::select;
/// use dcmvol_core::{ComponentType, VoxelType};
///
/// let plan = select(ComponentType::Float64, 3, 1, true).unwrap();
/// assert_eq!(plan.voxel, VoxelType::Float32);
/// assert!(!plan.compress);
/// ```
pub fn select(
    component: ComponentType,
    dimension: u32,
    channels: u16,
    requested_compress: bool,
) -> Result<ReconstructionPlan, Rejection> {
    if dimension != 2 && dimension != 3 {
        return Err(Rejection::UnsupportedDimension(dimension));
    }

    let rejected = Rejection::UnsupportedComponentType {
        component,
        channels,
    };

    let (voxel, compress) = match channels {
        3 | 4 => {
            if component != ComponentType::UInt8 {
                return Err(rejected);
            }
            let voxel = if channels == 3 {
                VoxelType::Rgb8
            } else {
                VoxelType::Rgba8
            };
            (voxel, requested_compress)
        }
        _ => {
            if channels != 1 {
                warn!("Invalid num of components: {}", channels);
            }
            match component {
                ComponentType::UInt8 => (VoxelType::UInt8, requested_compress),
                ComponentType::Int16 | ComponentType::Int32 => {
                    (VoxelType::Int16, requested_compress)
                }
                ComponentType::Float32 | ComponentType::Float64 => (VoxelType::Float32, false),
                _ => return Err(rejected),
            }
        }
    };

    Ok(ReconstructionPlan {
        voxel,
        dimension,
        channels,
        compress,
    })
}

/// Selects the plan for a probed series layout
pub fn select_for(image: &ImageInfo, requested_compress: bool) -> Result<ReconstructionPlan, Rejection> {
    select(
        image.component_type,
        image.dimension,
        image.channel_count,
        requested_compress,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ComponentType::UInt8, VoxelType::UInt8, true)]
    #[case(ComponentType::Int16, VoxelType::Int16, true)]
    #[case(ComponentType::Int32, VoxelType::Int16, true)]
    #[case(ComponentType::Float32, VoxelType::Float32, false)]
    #[case(ComponentType::Float64, VoxelType::Float32, false)]
    fn test_scalar_promotion(
        #[case] component: ComponentType,
        #[case] voxel: VoxelType,
        #[case] compress: bool,
    ) {
        for dimension in [2, 3] {
            let plan = select(component, dimension, 1, true).unwrap();
            assert_eq!(plan.voxel, voxel);
            assert_eq!(plan.dimension, dimension);
            assert_eq!(plan.compress, compress);
        }
    }

    #[rstest]
    #[case(ComponentType::Int8)]
    #[case(ComponentType::UInt16)]
    #[case(ComponentType::UInt32)]
    #[case(ComponentType::Unknown)]
    fn test_scalar_rejections(#[case] component: ComponentType) {
        assert_eq!(
            select(component, 3, 1, false),
            Err(Rejection::UnsupportedComponentType {
                component,
                channels: 1
            })
        );
    }

    #[test]
    fn test_requested_compression_passes_through() {
        assert!(!select(ComponentType::Int16, 3, 1, false).unwrap().compress);
        assert!(select(ComponentType::UInt8, 2, 3, true).unwrap().compress);
    }

    #[rstest]
    #[case(3, VoxelType::Rgb8)]
    #[case(4, VoxelType::Rgba8)]
    fn test_color(#[case] channels: u16, #[case] voxel: VoxelType) {
        let plan = select(ComponentType::UInt8, 2, channels, false).unwrap();
        assert_eq!(plan.voxel, voxel);
        assert_eq!(plan.channels, channels);
        assert!(select(ComponentType::Int16, 2, channels, false).is_err());
        assert!(select(ComponentType::Float32, 2, channels, false).is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    fn test_unsupported_dimension(#[case] dimension: u32) {
        assert_eq!(
            select(ComponentType::Int16, dimension, 1, false),
            Err(Rejection::UnsupportedDimension(dimension))
        );
    }

    #[test]
    fn test_odd_channel_count_is_not_rejected() {
        let plan = select(ComponentType::Int16, 3, 2, false).unwrap();
        assert_eq!(plan.voxel, VoxelType::Int16);
        assert_eq!(plan.channels, 2);
    }

    #[test]
    fn test_matrix_is_total() {
        for component in ComponentType::ALL {
            for dimension in 0..=5 {
                for channels in 0..=5 {
                    // Every triple resolves to exactly one outcome without panicking
                    match select(component, dimension, channels, true) {
                        Ok(plan) => {
                            assert!(dimension == 2 || dimension == 3);
                            assert_eq!(plan.dimension, dimension);
                        }
                        Err(Rejection::UnsupportedDimension(d)) => {
                            assert_eq!(d, dimension);
                            assert!(dimension != 2 && dimension != 3);
                        }
                        Err(Rejection::UnsupportedComponentType { component: c, .. }) => {
                            assert_eq!(c, component);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejection_into_error() {
        let err: DcmvolError = Rejection::UnsupportedDimension(4).into();
        assert!(matches!(err, DcmvolError::UnsupportedDimension(4)));
    }
}
