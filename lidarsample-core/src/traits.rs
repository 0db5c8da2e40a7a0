//! Core traits for lidarsample

use crate::{crs::Crs, error::Result, point::*, point_cloud::*};

/// Anything with a position in the working frame
pub trait Positioned {
    fn position(&self) -> Point3d;

    /// Whether the value may be indexed (no NaN or infinite component)
    fn is_finite(&self) -> bool {
        self.position().iter().all(|c| c.is_finite())
    }
}

impl Positioned for Point3d {
    fn position(&self) -> Point3d {
        *self
    }
}

impl Positioned for LidarPoint {
    fn position(&self) -> Point3d {
        self.position
    }

    fn is_finite(&self) -> bool {
        LidarPoint::is_finite(self)
    }
}

/// Trait for objects with an axis-aligned extent
pub trait Bounded {
    /// Get the bounding box of the object as `(min, max)` corners
    fn bounding_box(&self) -> Option<(Point3d, Point3d)>;

    /// Get the center point of the bounding box
    fn center(&self) -> Option<Point3d> {
        self.bounding_box()
            .map(|(min, max)| nalgebra::center(&min, &max))
    }
}

impl<T: Positioned> Bounded for PointCloud<T> {
    fn bounding_box(&self) -> Option<(Point3d, Point3d)> {
        let first = self.points.first()?.position();
        let mut min = first;
        let mut max = first;

        for point in &self.points {
            let p = point.position();
            min = min.inf(&p);
            max = max.sup(&p);
        }

        Some((min, max))
    }
}

/// Moves clouds between a caller's target frame and the Cartesian working
/// frame the subsampling engine operates in.
pub trait CoordinateAdapter {
    /// The frame clouds are expressed in after `to_working`
    fn working_crs(&self) -> Crs;

    fn to_working(&self, cloud: &LidarCloud) -> Result<LidarCloud>;

    fn to_target(&self, cloud: &LidarCloud) -> Result<LidarCloud>;
}
