//! Voxel grid indexing
//!
//! Partitions a point cloud into axis-aligned cubic voxels anchored at the
//! cloud's minimum corner. Cells are right-open on every axis: a point lying
//! exactly on a boundary belongs to the higher-index voxel.

use itertools::Itertools;
use std::collections::HashMap;
use lidarsample_core::{Error, Point3d, PointCloud, Positioned, Result};

/// Integer coordinates of a voxel, ordered lexicographically (x, then y, then z)
pub type VoxelKey = [i64; 3];

/// Largest per-axis key magnitude accepted; keeps `key * voxel_size` exact
/// enough to reconstruct cell bounds and rules out float-to-int saturation.
const MAX_KEY: f64 = (1u64 << 53) as f64;

/// One non-empty voxel and the indices of its member points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGroup {
    pub key: VoxelKey,
    /// Member indices into the source cloud, ascending
    pub indices: Vec<usize>,
}

impl VoxelGroup {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The sparse result of partitioning a cloud.
///
/// Groups are sorted by ascending key, so iterating a grid is deterministic
/// for a given input.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    min_corner: Point3d,
    voxel_size: f64,
    dimensions: [u64; 3],
    groups: Vec<VoxelGroup>,
}

impl VoxelGrid {
    fn empty(voxel_size: f64) -> Self {
        Self {
            min_corner: Point3d::origin(),
            voxel_size,
            dimensions: [0; 3],
            groups: Vec::new(),
        }
    }

    /// Number of non-empty voxels
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[VoxelGroup] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoxelGroup> {
        self.groups.iter()
    }

    pub fn into_groups(self) -> Vec<VoxelGroup> {
        self.groups
    }

    /// Component-wise minimum of the indexed cloud; origin for an empty grid
    pub fn min_corner(&self) -> Point3d {
        self.min_corner
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Number of voxels per axis spanned by the cloud's bounding box
    pub fn dimensions(&self) -> [u64; 3] {
        self.dimensions
    }

    /// Total number of voxels in the dense grid covering the bounding box.
    ///
    /// This is an upper bound on `len()`, not the number of occupied cells.
    pub fn capacity(&self) -> u64 {
        self.dimensions
            .iter()
            .fold(1u64, |acc, &d| acc.saturating_mul(d))
    }

    /// Total membership across all groups
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(VoxelGroup::len).sum()
    }

    /// Look up the group for a key
    pub fn get(&self, key: &VoxelKey) -> Option<&VoxelGroup> {
        self.groups
            .binary_search_by(|g| g.key.cmp(key))
            .ok()
            .map(|i| &self.groups[i])
    }

    /// The `[min, max)` corners of the cell with the given key
    pub fn cell_bounds(&self, key: &VoxelKey) -> (Point3d, Point3d) {
        let v = self.voxel_size;
        let min = Point3d::new(
            self.min_corner.x + key[0] as f64 * v,
            self.min_corner.y + key[1] as f64 * v,
            self.min_corner.z + key[2] as f64 * v,
        );
        let max = Point3d::new(min.x + v, min.y + v, min.z + v);
        (min, max)
    }
}

impl<'a> IntoIterator for &'a VoxelGrid {
    type Item = &'a VoxelGroup;
    type IntoIter = std::slice::Iter<'a, VoxelGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Partitions clouds with a fixed voxel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridIndexer {
    voxel_size: f64,
}

impl GridIndexer {
    /// Create an indexer; `voxel_size` must be finite and strictly positive
    pub fn new(voxel_size: f64) -> Result<Self> {
        validate_voxel_size(voxel_size)?;
        Ok(Self { voxel_size })
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Group the points of `cloud` by voxel.
    ///
    /// Single pass over the input plus a hash map; the final sort touches only
    /// the occupied voxels.
    pub fn partition<T: Positioned>(&self, cloud: &PointCloud<T>) -> Result<VoxelGrid> {
        let voxel_size = self.voxel_size;
        if cloud.is_empty() {
            return Ok(VoxelGrid::empty(voxel_size));
        }

        let (min_corner, max_corner) = finite_extent(&cloud.points)?;
        let dimensions = grid_dimensions(&min_corner, &max_corner, voxel_size)?;

        let mut voxel_map: HashMap<VoxelKey, Vec<usize>> = HashMap::new();
        for (idx, point) in cloud.points.iter().enumerate() {
            let key = voxel_key(&point.position(), &min_corner, voxel_size);
            voxel_map.entry(key).or_default().push(idx);
        }

        let groups: Vec<VoxelGroup> = voxel_map
            .into_iter()
            .sorted_unstable_by_key(|(key, _)| *key)
            .map(|(key, indices)| VoxelGroup { key, indices })
            .collect();

        log::debug!(
            "partitioned {} points into {} voxels (voxel_size = {}, capacity {:?})",
            cloud.len(),
            groups.len(),
            voxel_size,
            dimensions
        );

        Ok(VoxelGrid {
            min_corner,
            voxel_size,
            dimensions,
            groups,
        })
    }
}

/// Partition a point cloud into non-empty voxels
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `voxel_size` - Edge length of each voxel cube, in working-frame units
///
/// # Returns
/// * `Result<VoxelGrid>` - Occupied voxels in ascending key order
///
/// # Example
/// ```rust
/// use lidarsample_core::{LidarPoint, PointCloud};
/// use lidarsample_algorithms::partition;
///
/// fn main() -> lidarsample_core::Result<()> {
///     let cloud = PointCloud::from_points(vec![
///         LidarPoint::new(0.0, 0.0, 0.0, 10.0),
///         LidarPoint::new(0.5, 0.5, 0.0, 20.0),
///         LidarPoint::new(5.0, 5.0, 0.0, 30.0),
///     ]);
///
///     let grid = partition(&cloud, 1.0)?;
///     assert_eq!(grid.len(), 2);
///     assert_eq!(grid.groups()[0].indices, vec![0, 1]);
///     Ok(())
/// }
/// ```
pub fn partition<T: Positioned>(cloud: &PointCloud<T>, voxel_size: f64) -> Result<VoxelGrid> {
    GridIndexer::new(voxel_size)?.partition(cloud)
}

/// Number of voxels per axis of the dense grid covering `cloud`
pub fn grid_capacity<T: Positioned>(cloud: &PointCloud<T>, voxel_size: f64) -> Result<[u64; 3]> {
    validate_voxel_size(voxel_size)?;
    if cloud.is_empty() {
        return Ok([0; 3]);
    }
    let (min_corner, max_corner) = finite_extent(&cloud.points)?;
    grid_dimensions(&min_corner, &max_corner, voxel_size)
}

pub(crate) fn validate_voxel_size(voxel_size: f64) -> Result<()> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "voxel_size must be positive and finite, got {voxel_size}"
        )));
    }
    Ok(())
}

/// Bounding box of the points, refusing any non-finite value
fn finite_extent<T: Positioned>(points: &[T]) -> Result<(Point3d, Point3d)> {
    let mut min = Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

    for (idx, point) in points.iter().enumerate() {
        if !point.is_finite() {
            return Err(Error::InvalidData(format!(
                "non-finite value in point {idx}"
            )));
        }
        let p = point.position();
        min = min.inf(&p);
        max = max.sup(&p);
    }

    Ok((min, max))
}

fn grid_dimensions(min: &Point3d, max: &Point3d, voxel_size: f64) -> Result<[u64; 3]> {
    let mut dims = [0u64; 3];
    for axis in 0..3 {
        let extent = max[axis] - min[axis];
        if !extent.is_finite() {
            return Err(Error::InvalidData(format!(
                "extent on axis {axis} overflows f64 (from {} to {})",
                min[axis], max[axis]
            )));
        }
        let span = (extent / voxel_size).floor();
        if !span.is_finite() || span >= MAX_KEY {
            return Err(Error::InvalidParameter(format!(
                "voxel_size {voxel_size} is too small for an extent of {extent} on axis {axis}"
            )));
        }
        // the max corner sits in cell `span`, so the axis holds span + 1 cells
        dims[axis] = span as u64 + 1;
    }
    Ok(dims)
}

#[inline]
fn voxel_key(point: &Point3d, min_corner: &Point3d, voxel_size: f64) -> VoxelKey {
    [
        ((point.x - min_corner.x) / voxel_size).floor() as i64,
        ((point.y - min_corner.y) / voxel_size).floor() as i64,
        ((point.z - min_corner.z) / voxel_size).floor() as i64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidarsample_core::{LidarCloud, LidarPoint};
    use proptest::prelude::*;

    fn scenario() -> LidarCloud {
        PointCloud::from_points(vec![
            LidarPoint::new(0.0, 0.0, 0.0, 10.0),
            LidarPoint::new(0.5, 0.5, 0.0, 20.0),
            LidarPoint::new(5.0, 5.0, 0.0, 30.0),
        ])
    }

    #[test]
    fn test_partition_scenario() {
        let grid = partition(&scenario(), 1.0).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.groups()[0].key, [0, 0, 0]);
        assert_eq!(grid.groups()[0].indices, vec![0, 1]);
        assert_eq!(grid.groups()[1].key, [5, 5, 0]);
        assert_eq!(grid.groups()[1].indices, vec![2]);
        assert_eq!(grid.member_count(), 3);
    }

    #[test]
    fn test_partition_empty_cloud() {
        let grid = partition(&LidarCloud::new(), 1.0).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.capacity(), 0);
    }

    #[test]
    fn test_partition_invalid_voxel_size() {
        let cloud = scenario();
        for v in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                partition(&cloud, v),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_invalid_voxel_size_checked_before_empty_input() {
        assert!(matches!(
            partition(&LidarCloud::new(), 0.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_partition_rejects_non_finite() {
        let mut cloud = scenario();
        cloud.push(LidarPoint::new(f64::NAN, 0.0, 0.0, 0.0));
        let err = partition(&cloud, 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidData(ref m) if m.contains('3')));

        let mut cloud = scenario();
        cloud.push(LidarPoint::new(1.0, 1.0, 1.0, f64::INFINITY));
        assert!(matches!(partition(&cloud, 1.0), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_boundary_points_go_to_higher_cell() {
        let cloud = PointCloud::from_points(vec![
            LidarPoint::from_xyz(0.0, 0.0, 0.0),
            LidarPoint::from_xyz(1.0, 0.0, 0.0),
            LidarPoint::from_xyz(2.0, 0.0, 0.0),
        ]);
        let grid = partition(&cloud, 1.0).unwrap();
        let keys: Vec<VoxelKey> = grid.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![[0, 0, 0], [1, 0, 0], [2, 0, 0]]);
        assert_eq!(grid.dimensions(), [3, 1, 1]);
    }

    #[test]
    fn test_min_corner_is_componentwise() {
        let cloud = PointCloud::from_points(vec![
            LidarPoint::from_xyz(3.0, -1.0, 7.0),
            LidarPoint::from_xyz(-2.0, 4.0, 9.0),
        ]);
        let grid = partition(&cloud, 2.0).unwrap();
        assert_eq!(grid.min_corner(), Point3d::new(-2.0, -1.0, 7.0));
        assert_eq!(grid.iter().map(|g| g.key).collect::<Vec<_>>(), vec![[0, 2, 1], [2, 0, 0]]);
    }

    #[test]
    fn test_cell_bounds_and_lookup() {
        let grid = partition(&scenario(), 1.0).unwrap();
        let (min, max) = grid.cell_bounds(&[5, 5, 0]);
        assert_eq!(min, Point3d::new(5.0, 5.0, 0.0));
        assert_eq!(max, Point3d::new(6.0, 6.0, 1.0));
        assert_eq!(grid.get(&[5, 5, 0]).unwrap().indices, vec![2]);
        assert!(grid.get(&[1, 1, 0]).is_none());
    }

    #[test]
    fn test_grid_capacity() {
        let cloud = scenario();
        assert_eq!(grid_capacity(&cloud, 1.0).unwrap(), [6, 6, 1]);
        assert_eq!(grid_capacity(&cloud, 2.0).unwrap(), [3, 3, 1]);
        assert_eq!(partition(&cloud, 1.0).unwrap().capacity(), 36);
        assert!(grid_capacity(&cloud, 0.0).is_err());
    }

    #[test]
    fn test_voxel_size_too_small_for_extent() {
        let cloud = PointCloud::from_points(vec![
            LidarPoint::from_xyz(0.0, 0.0, 0.0),
            LidarPoint::from_xyz(1.0e9, 0.0, 0.0),
        ]);
        assert!(matches!(
            partition(&cloud, 1.0e-9),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_overflowing_extent_is_invalid_data() {
        let cloud = PointCloud::from_points(vec![
            LidarPoint::from_xyz(-1.0e308, 0.0, 0.0),
            LidarPoint::from_xyz(1.0e308, 0.0, 0.0),
        ]);
        for v in [1.0, 1.0e300, 1.0e308] {
            assert!(matches!(
                partition(&cloud, v),
                Err(Error::InvalidData(ref m)) if m.contains("overflows")
            ));
        }
        assert!(matches!(grid_capacity(&cloud, 1.0e308), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_larger_cells_need_not_nest() {
        let cloud: LidarCloud = [0.0, 0.5, 2.0, 2.5]
            .iter()
            .map(|&x| LidarPoint::from_xyz(x, 0.0, 0.0))
            .collect();
        assert_eq!(partition(&cloud, 1.0).unwrap().len(), 2);
        assert_eq!(partition(&cloud, 1.2).unwrap().len(), 3);
        assert_eq!(partition(&cloud, 2.0).unwrap().len(), 2);
    }

    #[test]
    fn test_partition_bare_positions() {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(0.1, 0.1, 0.1),
            Point3d::new(0.2, 0.2, 0.2),
        ]);
        assert_eq!(partition(&cloud, 1.0).unwrap().len(), 1);
    }

    proptest! {
        #[test]
        fn partition_covers_every_index_once(
            pts in prop::collection::vec(
                (-100.0f64..100.0, -100.0f64..100.0, -10.0f64..10.0),
                1..500,
            ),
            voxel_size in 0.05f64..20.0,
        ) {
            let cloud: LidarCloud =
                pts.iter().map(|&(x, y, z)| LidarPoint::from_xyz(x, y, z)).collect();
            let grid = partition(&cloud, voxel_size).unwrap();

            let mut seen: Vec<usize> =
                grid.iter().flat_map(|g| g.indices.iter().copied()).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..cloud.len()).collect::<Vec<_>>());

            prop_assert!(grid.iter().all(|g| !g.is_empty()));
            prop_assert!(grid.groups().windows(2).all(|w| w[0].key < w[1].key));
            prop_assert!(grid.len() as u64 <= grid.capacity());
        }

        #[test]
        fn members_fall_inside_their_cell(
            pts in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, -5.0f64..5.0), 1..300),
            voxel_size in 0.1f64..10.0,
        ) {
            let cloud: LidarCloud =
                pts.iter().map(|&(x, y, z)| LidarPoint::from_xyz(x, y, z)).collect();
            let grid = partition(&cloud, voxel_size).unwrap();
            let eps = 1e-9;
            for group in &grid {
                let (min, max) = grid.cell_bounds(&group.key);
                for &i in &group.indices {
                    let p = cloud[i].position;
                    for axis in 0..3 {
                        prop_assert!(p[axis] >= min[axis] - eps && p[axis] <= max[axis] + eps);
                    }
                }
            }
        }
    }
}
