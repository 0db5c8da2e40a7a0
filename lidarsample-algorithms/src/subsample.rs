//! Configurable subsampling entry point
//!
//! Selects one of the reductions from a serializable configuration and,
//! optionally, moves the cloud through a [`CoordinateAdapter`] around it.

use serde::{Deserialize, Serialize};
use lidarsample_core::{CoordinateAdapter, Error, LidarCloud, Result};

use crate::grid::validate_voxel_size;
use crate::reduction::Reducer;

/// Stride used when a decimation strategy is built without an explicit factor
pub const DEFAULT_DECIMATION_FACTOR: usize = 20;

/// Edge length used by the default voxel strategy, in working-frame units
pub const DEFAULT_VOXEL_SIZE: f64 = 1.0;

/// Which point represents a voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionPolicy {
    /// Mean position and elevation of the voxel's members
    #[default]
    Barycenter,
    /// Member point closest to the voxel's barycenter
    CandidateCenter,
}

/// How a cloud is reduced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SubsampleStrategy {
    /// Keep every `factor`-th point
    Decimate { factor: usize },
    /// One representative per occupied voxel
    Voxel {
        voxel_size: f64,
        #[serde(default)]
        policy: ReductionPolicy,
    },
}

impl SubsampleStrategy {
    pub fn decimate(factor: usize) -> Self {
        Self::Decimate { factor }
    }

    pub fn barycenter(voxel_size: f64) -> Self {
        Self::Voxel {
            voxel_size,
            policy: ReductionPolicy::Barycenter,
        }
    }

    pub fn candidate_center(voxel_size: f64) -> Self {
        Self::Voxel {
            voxel_size,
            policy: ReductionPolicy::CandidateCenter,
        }
    }
}

impl Default for SubsampleStrategy {
    fn default() -> Self {
        Self::barycenter(DEFAULT_VOXEL_SIZE)
    }
}

/// Configuration for [`Subsampler`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsampleConfig {
    pub strategy: SubsampleStrategy,
    /// Reduce voxels on the rayon pool
    pub parallel: bool,
}

impl Default for SubsampleConfig {
    fn default() -> Self {
        Self {
            strategy: SubsampleStrategy::default(),
            parallel: true,
        }
    }
}

impl SubsampleConfig {
    pub fn new(strategy: SubsampleStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Check the parameters without touching any data
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            SubsampleStrategy::Decimate { factor } if factor == 0 => Err(Error::InvalidParameter(
                "decimation factor must be at least 1".to_string(),
            )),
            SubsampleStrategy::Decimate { .. } => Ok(()),
            SubsampleStrategy::Voxel { voxel_size, .. } => validate_voxel_size(voxel_size),
        }
    }
}

/// Runs the configured reduction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subsampler {
    config: SubsampleConfig,
    reducer: Reducer,
}

impl Subsampler {
    /// Create a subsampler, rejecting invalid parameters up front
    pub fn new(config: SubsampleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reducer: Reducer::new().with_parallel(config.parallel),
        })
    }

    pub fn config(&self) -> &SubsampleConfig {
        &self.config
    }

    /// Reduce a cloud already expressed in the working frame
    pub fn run(&self, cloud: &LidarCloud) -> Result<LidarCloud> {
        let reduced = match self.config.strategy {
            SubsampleStrategy::Decimate { factor } => self.reducer.decimate(cloud, factor)?,
            SubsampleStrategy::Voxel { voxel_size, policy } => match policy {
                ReductionPolicy::Barycenter => self.reducer.voxel_barycenter(cloud, voxel_size)?,
                ReductionPolicy::CandidateCenter => {
                    self.reducer.voxel_candidate_center(cloud, voxel_size)?
                }
            },
        };

        log::info!(
            "subsampled {} points to {} ({:?})",
            cloud.len(),
            reduced.len(),
            self.config.strategy
        );
        Ok(reduced)
    }

    /// Move `cloud` into the adapter's working frame, reduce it, and move the
    /// result back to the caller's frame
    pub fn run_with_adapter<A>(&self, cloud: &LidarCloud, adapter: &A) -> Result<LidarCloud>
    where
        A: CoordinateAdapter + ?Sized,
    {
        let working = adapter.to_working(cloud)?;
        log::trace!("reducing in working frame {}", adapter.working_crs());
        let reduced = self.run(&working)?;
        adapter.to_target(&reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidarsample_core::{AffineAdapter, Crs, LidarPoint, Point3, PointCloud};

    fn scenario() -> LidarCloud {
        PointCloud::from_points(vec![
            LidarPoint::new(0.0, 0.0, 0.0, 10.0),
            LidarPoint::new(0.5, 0.5, 0.0, 20.0),
            LidarPoint::new(5.0, 5.0, 0.0, 30.0),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = SubsampleConfig::default();
        assert_eq!(config.strategy, SubsampleStrategy::barycenter(1.0));
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(SubsampleConfig::new(SubsampleStrategy::decimate(0)).validate().is_err());
        assert!(SubsampleConfig::new(SubsampleStrategy::barycenter(0.0)).validate().is_err());
        assert!(SubsampleConfig::new(SubsampleStrategy::candidate_center(-1.0))
            .validate()
            .is_err());
        assert!(matches!(
            Subsampler::new(SubsampleConfig::new(SubsampleStrategy::decimate(0))),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_policy_dispatch() {
        let cloud = scenario();

        let bary =
            Subsampler::new(SubsampleConfig::new(SubsampleStrategy::barycenter(1.0))).unwrap();
        assert_eq!(bary.run(&cloud).unwrap()[0], LidarPoint::new(0.25, 0.25, 0.0, 15.0));

        let cand = Subsampler::new(SubsampleConfig::new(SubsampleStrategy::candidate_center(1.0)))
            .unwrap();
        assert_eq!(cand.run(&cloud).unwrap()[0], cloud[0]);

        let dec = Subsampler::new(SubsampleConfig::new(SubsampleStrategy::decimate(2))).unwrap();
        let out = dec.run(&cloud).unwrap();
        assert_eq!(out.points, vec![cloud[0], cloud[2]]);
    }

    #[test]
    fn test_config_from_json() {
        let config: SubsampleConfig = serde_json::from_str(
            r#"{
                "strategy": { "method": "voxel", "voxel_size": 2.5, "policy": "candidate_center" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.strategy, SubsampleStrategy::candidate_center(2.5));
        assert!(config.parallel);

        let config: SubsampleConfig = serde_json::from_str(
            r#"{ "strategy": { "method": "decimate", "factor": 20 }, "parallel": false }"#,
        )
        .unwrap();
        assert_eq!(config.strategy, SubsampleStrategy::decimate(DEFAULT_DECIMATION_FACTOR));
        assert!(!config.parallel);

        let config: SubsampleConfig =
            serde_json::from_str(r#"{ "strategy": { "method": "voxel", "voxel_size": 3.0 } }"#)
                .unwrap();
        assert_eq!(config.strategy, SubsampleStrategy::barycenter(3.0));
    }

    #[test]
    fn test_run_with_adapter() {
        let origin = Point3::new(500_000.0, 4_000_000.0, 0.0);
        let adapter = AffineAdapter::local_origin(Crs::NAD83_UTM_15N, origin);
        let cloud: LidarCloud = scenario()
            .into_iter()
            .map(|p| {
                LidarPoint::new(
                    p.position.x + origin.x,
                    p.position.y + origin.y,
                    p.position.z,
                    p.elevation,
                )
            })
            .collect::<LidarCloud>()
            .with_crs(Crs::NAD83_UTM_15N);

        let subsampler =
            Subsampler::new(SubsampleConfig::new(SubsampleStrategy::barycenter(1.0))).unwrap();
        let out = subsampler.run_with_adapter(&cloud, &adapter).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.crs, Some(Crs::NAD83_UTM_15N));
        assert!((out[0].position.x - 500_000.25).abs() < 1e-6);
        assert!((out[0].position.y - 4_000_000.25).abs() < 1e-6);
        assert_eq!(out[0].elevation, 15.0);
    }
}
