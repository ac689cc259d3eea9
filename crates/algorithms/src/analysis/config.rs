//! Analysis configuration

use serde::{Deserialize, Serialize};
use unreach_core::{Error, Result, CRS};

use crate::distance::DistanceMode;
use crate::terrain::CostSurfaceParams;

/// Every tunable of one remoteness analysis.
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```ignore
/// let config: AnalysisConfig = serde_json::from_str(r#"{
///     "resolution_m": 100,
///     "distance_mode": "cost-weighted",
///     "top_n": 10
/// }"#)?;
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cell size in meters (default 250)
    pub resolution_m: f64,
    /// Projected CRS of the analysis grid (default EPSG:5070)
    pub crs: CRS,
    pub distance_mode: DistanceMode,
    /// Cost surface construction, used in cost-weighted mode
    pub cost: CostSurfaceParams,
    /// Number of ranked remote points to report (default 5)
    pub top_n: usize,
    /// Minimum distance between ranked points in km (default 25)
    pub min_separation_km: f64,
    /// Land-cover codes that can never be reported as destinations
    /// (default open water and perennial ice/snow)
    pub exclude_landcover: Vec<i32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            resolution_m: 250.0,
            crs: CRS::conus_albers(),
            distance_mode: DistanceMode::Euclidean,
            cost: CostSurfaceParams::default(),
            top_n: 5,
            min_separation_km: 25.0,
            exclude_landcover: vec![11, 12],
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.resolution_m.is_finite() || self.resolution_m <= 0.0 {
            return Err(Error::invalid_parameter("resolution_m", self.resolution_m, "must be positive"));
        }
        if self.top_n == 0 {
            return Err(Error::invalid_parameter("top_n", self.top_n, "must be at least 1"));
        }
        if !self.min_separation_km.is_finite() || self.min_separation_km < 0.0 {
            return Err(Error::invalid_parameter(
                "min_separation_km",
                self.min_separation_km,
                "must be finite and non-negative",
            ));
        }
        self.cost.validate()
    }
}
