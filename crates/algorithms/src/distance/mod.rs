//! Distance fields from source cells
//!
//! Two interchangeable measures share one contract: a `Raster<f64>` in meters
//! that is exactly 0 on source cells and never negative.
//!
//! - [`euclidean_distance`]: exact straight-line distance
//! - [`cost_distance`]: least accumulated traversal cost ("effective distance")

mod cost_distance;
mod euclidean;

pub use cost_distance::{cost_distance, CostDistance, CostDistanceParams};
pub use euclidean::{euclidean_distance, EuclideanDistance, EuclideanDistanceParams};

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use unreach_core::raster::Raster;
use unreach_core::Result;

/// How distance from the sources is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMode {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// Accumulated traversal cost over a cost surface
    #[serde(alias = "cost_weighted")]
    CostWeighted,
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMode::Euclidean => write!(f, "euclidean"),
            DistanceMode::CostWeighted => write!(f, "cost-weighted"),
        }
    }
}

/// A distance field and how it was actually computed
#[derive(Debug, Clone)]
pub struct DistanceOutcome {
    pub field: Raster<f64>,
    pub mode_used: DistanceMode,
    /// Cost-weighted was requested without a cost surface
    pub fell_back: bool,
}

/// Compute the distance field in the requested mode.
///
/// A cost-weighted request with no cost surface degrades to Euclidean and is
/// reported through [`DistanceOutcome::fell_back`]. The cost surface must have
/// the same shape as the source mask.
pub fn distance_field(
    mode: DistanceMode,
    sources: &Raster<u8>,
    cost: Option<&Raster<f64>>,
    resolution: f64,
) -> Result<DistanceOutcome> {
    let (rows, cols) = sources.shape();
    let start = Instant::now();

    let (field, mode_used, fell_back) = match (mode, cost) {
        (DistanceMode::CostWeighted, Some(cost)) => {
            (cost_distance(sources, cost, resolution)?, DistanceMode::CostWeighted, false)
        }
        (DistanceMode::CostWeighted, None) => {
            warn!("cost-weighted distance requested without a cost surface, using euclidean");
            (euclidean_distance(sources, resolution)?, DistanceMode::Euclidean, true)
        }
        (DistanceMode::Euclidean, _) => {
            (euclidean_distance(sources, resolution)?, DistanceMode::Euclidean, false)
        }
    };

    debug!(rows, cols, mode = %mode_used, elapsed = ?start.elapsed(), "distance field computed");
    let max = field
        .data()
        .iter()
        .filter(|d| d.is_finite())
        .fold(0.0_f64, |m, &d| m.max(d));
    info!(mode = %mode_used, max_km = format_args!("{:.1}", max / 1000.0), "distance field ready");

    Ok(DistanceOutcome {
        field,
        mode_used,
        fell_back,
    })
}
