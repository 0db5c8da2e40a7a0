//! Core data structures and traits for lidarsample
//!
//! This crate provides the fundamental types the subsampling engine works on:
//! LiDAR points with an elevation payload, CRS-tagged point clouds, planar
//! area-of-interest bounds and the coordinate adapter seam.

pub mod point;
pub mod point_cloud;
pub mod crs;
pub mod bounds;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use crs::*;
pub use bounds::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
