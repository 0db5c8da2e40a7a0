//! Affine transforms and the affine coordinate adapter

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::point_cloud::LidarCloud;
use crate::traits::CoordinateAdapter;

/// A 3D transformation that can be applied to points and point clouds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f64>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this transformation with another
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.matrix - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

/// Coordinate adapter backed by an invertible affine transform.
///
/// Typical use is shifting projected coordinates to a local origin so the
/// working frame keeps full precision, then shifting results back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineAdapter {
    target: Crs,
    working: Crs,
    forward: Transform3D,
    backward: Transform3D,
}

impl AffineAdapter {
    /// `forward` maps target-frame coordinates into the working frame
    pub fn new(target: Crs, working: Crs, forward: Transform3D) -> Result<Self> {
        let backward = forward.inverse().ok_or_else(|| {
            Error::InvalidParameter("adapter transform is not invertible".to_string())
        })?;
        Ok(Self {
            target,
            working,
            forward,
            backward,
        })
    }

    /// Working frame translated so that `origin` becomes the local origin
    pub fn local_origin(crs: Crs, origin: Point3<f64>) -> Self {
        let forward = Transform3D::translation(-origin.coords);
        Self {
            target: crs,
            working: crs,
            forward,
            backward: Transform3D::translation(origin.coords),
        }
    }

    fn apply(
        cloud: &LidarCloud,
        expected: Crs,
        output: Crs,
        transform: &Transform3D,
    ) -> Result<LidarCloud> {
        if let Some(found) = cloud.crs {
            if found != expected {
                return Err(Error::CrsMismatch { expected, found });
            }
        }
        let mut out = cloud.clone();
        out.transform(transform);
        out.crs = Some(output);
        Ok(out)
    }
}

impl CoordinateAdapter for AffineAdapter {
    fn working_crs(&self) -> Crs {
        self.working
    }

    fn to_working(&self, cloud: &LidarCloud) -> Result<LidarCloud> {
        Self::apply(cloud, self.target, self.working, &self.forward)
    }

    fn to_target(&self, cloud: &LidarCloud) -> Result<LidarCloud> {
        Self::apply(cloud, self.working, self.target, &self.backward)
    }
}
