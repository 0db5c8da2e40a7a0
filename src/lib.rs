//! # lidarsample
//!
//! Spatial subsampling of aerial LiDAR point clouds.
//!
//! This is the umbrella crate that re-exports the core types and the
//! subsampling algorithms. Use the individual crates for finer control over
//! dependencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use lidarsample::prelude::*;
//!
//! let cloud = PointCloud::from_points(vec![
//!     LidarPoint::new(0.0, 0.0, 0.0, 10.0),
//!     LidarPoint::new(0.5, 0.5, 0.0, 20.0),
//!     LidarPoint::new(5.0, 5.0, 0.0, 30.0),
//! ])
//! .with_crs(Crs::NAD83_UTM_15N);
//!
//! let config = SubsampleConfig::new(SubsampleStrategy::candidate_center(1.0));
//! let reduced = Subsampler::new(config)?.run(&cloud)?;
//! assert_eq!(reduced.len(), 2);
//! # Ok::<(), lidarsample::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms
//! - `algorithms`: Grid indexing, reductions and the configurable subsampler

// Re-export core functionality
pub use lidarsample_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use lidarsample_algorithms as algorithms;

/// Prelude module for convenient imports
pub mod prelude {
    pub use lidarsample_core::{
        AffineAdapter, Bounded, Bounds, CoordinateAdapter, Crs, Error, LidarCloud, LidarPoint,
        Point3d, PointCloud, Positioned, Result, Transform3D,
    };

    #[cfg(feature = "algorithms")]
    pub use lidarsample_algorithms::{
        decimate, grid_capacity, partition, voxel_barycenter, voxel_candidate_center,
        GridIndexer, ReductionPolicy, Reducer, SubsampleConfig, SubsampleStrategy, Subsampler,
        VoxelGrid, VoxelGroup, VoxelKey,
    };
}
