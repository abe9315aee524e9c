//! Core type definitions shared across the conversion pipeline
//!
//! - [`ComponentType`]: scalar storage type of a pixel sample discovered in a series
//! - [`VoxelType`]: voxel type written to the output volume
//! - [`TimeBasis`]: interpretation of timezone-less DICOM date/time values

mod component;
pub mod datetime;

pub use component::{ComponentType, VoxelType};
pub use datetime::TimeBasis;
