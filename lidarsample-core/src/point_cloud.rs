//! Point cloud data structures and functionality

use crate::bounds::Bounds;
use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
///
/// Every point in a cloud shares the optional CRS tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
    #[serde(default)]
    pub crs: Option<Crs>,
}

/// A point cloud of LiDAR returns
pub type LidarCloud = PointCloud<LidarPoint>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            crs: None,
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            crs: None,
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points, crs: None }
    }

    /// Set the CRS tag, consuming the cloud
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Build a cloud carrying the same CRS tag as `self`
    pub fn derive<U>(&self, points: Vec<U>) -> PointCloud<U> {
        PointCloud {
            points,
            crs: self.crs,
        }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.points.iter_mut()
    }

    /// Clear all points from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Reserve capacity for additional points
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    /// Append another cloud's points.
    ///
    /// An untagged side adopts the other side's tag; two different tags are
    /// refused, since a cloud may only hold one frame.
    pub fn merge(&mut self, other: PointCloud<T>) -> Result<()> {
        match (self.crs, other.crs) {
            (Some(expected), Some(found)) if expected != found => {
                return Err(Error::CrsMismatch { expected, found });
            }
            (None, Some(found)) => self.crs = Some(found),
            _ => {}
        }
        self.points.extend(other.points);
        Ok(())
    }
}

impl<T: Copy> PointCloud<T> {
    /// Copy the points at the given indices, in the order given
    pub fn select(&self, indices: &[usize]) -> Self {
        self.derive(indices.iter().map(|&i| self.points[i]).collect())
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> Extend<T> for PointCloud<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}

impl PointCloud<LidarPoint> {
    /// Build a cloud from parallel position and elevation arrays
    pub fn from_parts(positions: &[Point3d], elevations: &[f64]) -> Result<Self> {
        if positions.len() != elevations.len() {
            return Err(Error::InvalidData(format!(
                "{} positions but {} elevations",
                positions.len(),
                elevations.len()
            )));
        }
        Ok(positions
            .iter()
            .zip(elevations)
            .map(|(&position, &elevation)| LidarPoint { position, elevation })
            .collect())
    }

    /// Keep the points whose planar position falls inside `bounds`
    pub fn crop(&self, bounds: &Bounds) -> Self {
        self.derive(
            self.points
                .iter()
                .filter(|p| bounds.contains(p.position.x, p.position.y))
                .copied()
                .collect(),
        )
    }

    /// Apply a transformation to every position; elevations are left as they are
    pub fn transform(&mut self, transform: &Transform3D) {
        for point in &mut self.points {
            point.position = transform.transform_point(&point.position);
        }
    }

    /// The elevation values in cloud order
    pub fn elevations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elevation).collect()
    }
}
