//! # lidarsample algorithms
//!
//! Spatial subsampling for LiDAR point clouds.
//!
//! This crate provides voxel grid indexing, per-voxel reduction (barycenter
//! and nearest-to-barycenter), stride decimation, and a configurable
//! [`Subsampler`] that dispatches between them.

pub mod grid;
pub mod reduction;
pub mod subsample;

// Re-export commonly used items
pub use grid::*;
pub use reduction::*;
pub use subsample::*;
