//! Coordinate reference system tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate reference system identified by its EPSG code.
///
/// The engine never interprets the code; it only carries it alongside a cloud
/// so that collaborators can tell which frame the coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub u32);

impl Crs {
    /// WGS 84 / Pseudo-Mercator, the frame the public LiDAR tiles are indexed in
    pub const WEB_MERCATOR: Crs = Crs(3857);

    /// WGS 84 geographic coordinates
    pub const WGS84: Crs = Crs(4326);

    /// NAD83 / UTM zone 15N
    pub const NAD83_UTM_15N: Crs = Crs(26915);

    pub fn epsg(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Self(code)
    }
}
