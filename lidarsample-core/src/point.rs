//! Point types and related functionality

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use bytemuck::{Pod, Zeroable};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A LiDAR return: a position in the working frame plus its elevation.
///
/// The elevation is carried alongside the position as an opaque payload. It is
/// frequently identical to `position.z`, but a fetch collaborator may also
/// supply a separately measured height (e.g. above a geoid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct LidarPoint {
    pub position: Point3d,
    pub elevation: f64,
}

unsafe impl Pod for LidarPoint {}
unsafe impl Zeroable for LidarPoint {}

impl LidarPoint {
    /// Create a point from its coordinates and elevation
    pub fn new(x: f64, y: f64, z: f64, elevation: f64) -> Self {
        Self {
            position: Point3d::new(x, y, z),
            elevation,
        }
    }

    /// Create a point whose elevation is its z coordinate
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, z)
    }

    /// True when every coordinate and the elevation are finite
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.elevation.is_finite()
    }
}

impl Default for LidarPoint {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            elevation: 0.0,
        }
    }
}

impl From<LidarPoint> for Point3d {
    fn from(point: LidarPoint) -> Self {
        point.position
    }
}

impl From<Point3d> for LidarPoint {
    fn from(position: Point3d) -> Self {
        Self::from_xyz(position.x, position.y, position.z)
    }
}
