//! Point cloud reduction
//!
//! Stride decimation over the raw sequence, and per-voxel reduction over a
//! [`VoxelGrid`]: either the synthetic barycenter of each voxel, or the
//! original member point closest to that barycenter.

use rayon::prelude::*;
use lidarsample_core::{Error, LidarCloud, LidarPoint, Point3d, PointCloud, Result};

use crate::grid::{GridIndexer, VoxelGrid, VoxelGroup};

/// Runs reductions, optionally spreading per-voxel work over the rayon pool.
///
/// Output order and the nearest-point tie-break do not depend on `parallel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
    parallel: bool,
}

impl Default for Reducer {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Reducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce voxels on the calling thread only
    pub fn sequential() -> Self {
        Self { parallel: false }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Keep every `factor`-th point, starting with the first
    pub fn decimate<T: Copy>(&self, cloud: &PointCloud<T>, factor: usize) -> Result<PointCloud<T>> {
        if factor == 0 {
            return Err(Error::InvalidParameter(
                "decimation factor must be at least 1".to_string()
            ));
        }

        let points: Vec<T> = cloud.points.iter().step_by(factor).copied().collect();
        log::debug!("decimated {} points to {} (factor {})", cloud.len(), points.len(), factor);
        Ok(cloud.derive(points))
    }

    /// One synthetic point per voxel: the mean position and mean elevation of its members
    pub fn voxel_barycenter(&self, cloud: &LidarCloud, voxel_size: f64) -> Result<LidarCloud> {
        let grid = GridIndexer::new(voxel_size)?.partition(cloud)?;
        let points = self.reduce_groups(&grid, |group| barycenter(&cloud.points, &group.indices));
        log::debug!(
            "barycenter reduction: {} points -> {} voxels",
            cloud.len(),
            points.len()
        );
        Ok(cloud.derive(points))
    }

    /// One original point per voxel: the member closest to the voxel barycenter.
    ///
    /// Exact ties go to the member with the smallest index in `cloud`.
    pub fn voxel_candidate_center(
        &self,
        cloud: &LidarCloud,
        voxel_size: f64,
    ) -> Result<LidarCloud> {
        let grid = GridIndexer::new(voxel_size)?.partition(cloud)?;
        let points = self.reduce_groups(&grid, |group| {
            let idx = nearest_to_barycenter(&cloud.points, &group.indices);
            cloud.points[idx]
        });
        log::debug!(
            "candidate-center reduction: {} points -> {} voxels",
            cloud.len(),
            points.len()
        );
        Ok(cloud.derive(points))
    }

    /// Apply `reduce` to every group, keeping grid (ascending key) order
    fn reduce_groups<F>(&self, grid: &VoxelGrid, reduce: F) -> Vec<LidarPoint>
    where
        F: Fn(&VoxelGroup) -> LidarPoint + Sync + Send,
    {
        if self.parallel {
            grid.groups().par_iter().map(reduce).collect()
        } else {
            grid.groups().iter().map(reduce).collect()
        }
    }
}

/// Stride decimation, see [`Reducer::decimate`]
///
/// # Example
/// ```rust
/// use lidarsample_core::{LidarPoint, PointCloud};
/// use lidarsample_algorithms::decimate;
///
/// fn main() -> lidarsample_core::Result<()> {
///     let cloud: PointCloud<LidarPoint> = (0..10)
///         .map(|i| LidarPoint::from_xyz(i as f64, 0.0, 0.0))
///         .collect();
///
///     let decimated = decimate(&cloud, 3)?;
///     assert_eq!(decimated.len(), 4);
///     assert_eq!(decimated[1].position.x, 3.0);
///     Ok(())
/// }
/// ```
pub fn decimate<T: Copy>(cloud: &PointCloud<T>, factor: usize) -> Result<PointCloud<T>> {
    Reducer::default().decimate(cloud, factor)
}

/// Voxel barycenter reduction, see [`Reducer::voxel_barycenter`]
///
/// # Arguments
/// * `cloud` - Input point cloud, in the working frame
/// * `voxel_size` - Edge length of each voxel cube
///
/// # Returns
/// * `Result<LidarCloud>` - One barycenter per occupied voxel, in ascending voxel key order
///
/// # Example
/// ```rust
/// use lidarsample_core::{LidarPoint, PointCloud};
/// use lidarsample_algorithms::voxel_barycenter;
///
/// fn main() -> lidarsample_core::Result<()> {
///     let cloud = PointCloud::from_points(vec![
///         LidarPoint::new(0.0, 0.0, 0.0, 10.0),
///         LidarPoint::new(0.5, 0.5, 0.0, 20.0),
///         LidarPoint::new(5.0, 5.0, 0.0, 30.0),
///     ]);
///
///     let reduced = voxel_barycenter(&cloud, 1.0)?;
///     assert_eq!(reduced[0], LidarPoint::new(0.25, 0.25, 0.0, 15.0));
///     assert_eq!(reduced[1], LidarPoint::new(5.0, 5.0, 0.0, 30.0));
///     Ok(())
/// }
/// ```
pub fn voxel_barycenter(cloud: &LidarCloud, voxel_size: f64) -> Result<LidarCloud> {
    Reducer::default().voxel_barycenter(cloud, voxel_size)
}

/// Nearest-to-barycenter reduction, see [`Reducer::voxel_candidate_center`]
pub fn voxel_candidate_center(cloud: &LidarCloud, voxel_size: f64) -> Result<LidarCloud> {
    Reducer::default().voxel_candidate_center(cloud, voxel_size)
}

/// Mean position and elevation of the indexed points.
///
/// Accumulates offsets from the first member so large projected coordinates
/// keep their precision, and clamps the result to the members' extent.
fn barycenter(points: &[LidarPoint], indices: &[usize]) -> LidarPoint {
    let anchor = components(&points[indices[0]]);
    let mut offset = [0.0f64; 4];
    let mut lo = anchor;
    let mut hi = anchor;

    for &i in indices {
        let values = components(&points[i]);
        for k in 0..4 {
            offset[k] += values[k] - anchor[k];
            lo[k] = lo[k].min(values[k]);
            hi[k] = hi[k].max(values[k]);
        }
    }

    let n = indices.len() as f64;
    let mean: [f64; 4] = std::array::from_fn(|k| (anchor[k] + offset[k] / n).clamp(lo[k], hi[k]));
    LidarPoint::new(mean[0], mean[1], mean[2], mean[3])
}

#[inline]
fn components(p: &LidarPoint) -> [f64; 4] {
    [p.position.x, p.position.y, p.position.z, p.elevation]
}

/// Index (into `points`) of the member closest to the members' barycenter
fn nearest_to_barycenter(points: &[LidarPoint], indices: &[usize]) -> usize {
    let center: Point3d = barycenter(points, indices).position;

    let mut best = indices[0];
    let mut best_distance = nalgebra::distance(&points[best].position, &center);
    for &i in &indices[1..] {
        let d = nalgebra::distance(&points[i].position, &center);
        // strict comparison keeps the lowest index on ties; indices are ascending
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}
