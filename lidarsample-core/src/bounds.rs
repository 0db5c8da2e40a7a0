//! Planar area-of-interest bounds

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Axis-aligned planar bounds of an area of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    /// Create bounds, rejecting inverted or non-finite extents
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidParameter(
                "bounds must be finite".to_string()
            ));
        }
        if xmin > xmax || ymin > ymax {
            return Err(Error::InvalidParameter(format!(
                "inverted bounds: x [{xmin}, {xmax}], y [{ymin}, {ymax}]"
            )));
        }
        Ok(Self { xmin, xmax, ymin, ymax })
    }

    /// Inclusive containment test on the x/y plane
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Bounds as `([xmin, xmax], [ymin, ymax])` tuples
    pub fn as_tuple(&self) -> ([f64; 2], [f64; 2]) {
        ([self.xmin, self.xmax], [self.ymin, self.ymax])
    }

    /// Identifier built from the four extents, usable as a cache key
    pub fn name(&self) -> String {
        format!("{}_{}_{}_{}", self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// Formats as `([xmin, xmax], [ymin, ymax])`, the form EPT readers accept.
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "([{}, {}], [{}, {}])",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}
