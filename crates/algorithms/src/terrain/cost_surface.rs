//! Composite terrain traversal-cost surface
//!
//! Combines a slope-derived multiplier and a land-cover multiplier into one
//! cost grid where 1.0 is the easiest possible ground:
//!
//! ```text
//! cost = max(1, slope_cost^slope_weight * landcover_cost^landcover_weight)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use unreach_core::raster::Raster;
use unreach_core::{Algorithm, Error, Result};

use super::slope::{slope_degrees, SlopeParams};
use super::smoothing::{gaussian_smoothing, GaussianSmoothingParams};
use crate::resample::resample_like;

/// Slope breakpoints (degrees) the cost multipliers are pinned to
pub const SLOPE_BREAKPOINTS: [f64; 4] = [0.0, 15.0, 30.0, 45.0];

/// Cost multipliers at 0°, 15°, 30° and 45°; linear in between, clamped above 45°
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeCostParams {
    pub flat: f64,
    pub moderate: f64,
    pub steep: f64,
    pub very_steep: f64,
}

impl Default for SlopeCostParams {
    fn default() -> Self {
        Self {
            flat: 1.0,
            moderate: 2.0,
            steep: 4.0,
            very_steep: 10.0,
        }
    }
}

impl SlopeCostParams {
    fn costs(&self) -> [f64; 4] {
        [self.flat, self.moderate, self.steep, self.very_steep]
    }

    /// Multiplier for a slope in degrees. Undefined slope counts as flat.
    pub fn factor(&self, slope: f64) -> f64 {
        let costs = self.costs();
        if slope.is_nan() || slope <= SLOPE_BREAKPOINTS[0] {
            return costs[0];
        }
        for i in 1..SLOPE_BREAKPOINTS.len() {
            let (lo, hi) = (SLOPE_BREAKPOINTS[i - 1], SLOPE_BREAKPOINTS[i]);
            if slope <= hi {
                let t = (slope - lo) / (hi - lo);
                return costs[i - 1] + (costs[i] - costs[i - 1]) * t;
            }
        }
        costs[3]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("slope.flat", self.flat),
            ("slope.moderate", self.moderate),
            ("slope.steep", self.steep),
            ("slope.very_steep", self.very_steep),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::invalid_parameter(name, v, "cost multiplier must be positive"));
            }
        }
        Ok(())
    }
}

/// Land-cover class code -> traversal multiplier. Unlisted codes cost 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandcoverCostTable(BTreeMap<i32, f64>);

impl LandcoverCostTable {
    pub fn new(costs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self(costs.into_iter().collect())
    }

    /// Multiplier for a class code
    pub fn cost(&self, code: i32) -> f64 {
        self.0.get(&code).copied().unwrap_or(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn validate(&self) -> Result<()> {
        match self.0.iter().find(|(_, v)| !v.is_finite() || **v <= 0.0) {
            Some((code, v)) => Err(Error::invalid_parameter(
                "landcover_costs",
                format!("{code} -> {v}"),
                "cost multiplier must be positive",
            )),
            None => Ok(()),
        }
    }
}

impl Default for LandcoverCostTable {
    /// NLCD 2021 classes
    fn default() -> Self {
        Self::new([
            (11, 10.0), // open water
            (12, 8.0),  // perennial ice/snow
            (21, 1.1),  // developed, open space
            (22, 1.3),  // developed, low intensity
            (23, 1.5),  // developed, medium intensity
            (24, 2.0),  // developed, high intensity
            (31, 1.2),  // barren land
            (41, 2.0),  // deciduous forest
            (42, 2.2),  // evergreen forest
            (43, 2.1),  // mixed forest
            (52, 1.5),  // shrub/scrub
            (71, 1.2),  // grassland/herbaceous
            (81, 1.1),  // pasture/hay
            (82, 1.3),  // cultivated crops
            (90, 3.0),  // woody wetlands
            (95, 4.0),  // emergent herbaceous wetlands
        ])
    }
}

/// Parameters for building a cost surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSurfaceParams {
    pub slope: SlopeCostParams,
    pub landcover_costs: LandcoverCostTable,
    /// Exponent applied to the slope multiplier (default 1.0)
    pub slope_weight: f64,
    /// Exponent applied to the land-cover multiplier (default 1.0)
    pub landcover_weight: f64,
    /// Gaussian sigma in cells for slope denoising; 0 disables it (default 1.0)
    pub smoothing_sigma: f64,
}

impl Default for CostSurfaceParams {
    fn default() -> Self {
        Self {
            slope: SlopeCostParams::default(),
            landcover_costs: LandcoverCostTable::default(),
            slope_weight: 1.0,
            landcover_weight: 1.0,
            smoothing_sigma: 1.0,
        }
    }
}

impl CostSurfaceParams {
    pub fn validate(&self) -> Result<()> {
        self.slope.validate()?;
        self.landcover_costs.validate()?;
        for (name, v) in [
            ("slope_weight", self.slope_weight),
            ("landcover_weight", self.landcover_weight),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::invalid_parameter(name, v, "weight must be finite and non-negative"));
            }
        }
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma < 0.0 {
            return Err(Error::invalid_parameter(
                "smoothing_sigma",
                self.smoothing_sigma,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Every layer produced while building a cost surface
#[derive(Debug, Clone)]
pub struct CostSurface {
    /// Smoothed slope in degrees
    pub slope: Raster<f64>,
    /// Slope multiplier per cell
    pub slope_cost: Raster<f64>,
    /// Land-cover multiplier per cell, on the elevation lattice
    pub landcover_cost: Option<Raster<f64>>,
    /// Composite cost, every cell >= 1.0
    pub cost: Raster<f64>,
}

/// Slope multiplier for every cell of a slope raster (degrees)
pub fn slope_cost_factor(slope: &Raster<f64>, params: &SlopeCostParams) -> Raster<f64> {
    slope.map(|s| params.factor(s))
}

/// Land-cover multiplier for every cell of a class-code raster
pub fn landcover_cost_factor(landcover: &Raster<i32>, table: &LandcoverCostTable) -> Raster<f64> {
    landcover.map(|code| table.cost(code))
}

/// Combine multipliers: `max(1, slope^ws * landcover^wl)`
pub fn composite_cost(
    slope_cost: &Raster<f64>,
    landcover_cost: Option<&Raster<f64>>,
    slope_weight: f64,
    landcover_weight: f64,
) -> Result<Raster<f64>> {
    let mut cost = slope_cost.map(|s| s.powf(slope_weight));
    if let Some(lc) = landcover_cost {
        slope_cost.ensure_same_shape(lc)?;
        ndarray::Zip::from(cost.data_mut())
            .and(lc.data())
            .for_each(|c, &l| *c *= l.powf(landcover_weight));
    }
    cost.data_mut().mapv_inplace(|c| if c.is_nan() { 1.0 } else { c.max(1.0) });
    Ok(cost)
}

/// Build the composite cost surface on the elevation raster's lattice.
///
/// Land cover is resampled (nearest neighbor) onto the elevation lattice when
/// their shape or transform differ; cells it does not cover cost 1.0.
pub fn cost_surface(
    elevation: &Raster<f64>,
    landcover: Option<&Raster<i32>>,
    params: &CostSurfaceParams,
) -> Result<CostSurface> {
    params.validate()?;
    let (rows, cols) = elevation.shape();
    debug!(rows, cols, "building cost surface");

    let raw_slope = slope_degrees(elevation, SlopeParams::default())?;
    let slope = if params.smoothing_sigma > 0.0 {
        gaussian_smoothing(
            &raw_slope,
            GaussianSmoothingParams {
                sigma: params.smoothing_sigma,
                radius: 0,
            },
        )?
    } else {
        raw_slope
    };
    let slope_cost = slope_cost_factor(&slope, &params.slope);

    let landcover_cost = match landcover {
        Some(lc) => {
            let aligned = if elevation.is_aligned_with(lc) {
                lc.clone()
            } else {
                debug!(from = ?lc.shape(), to = ?elevation.shape(), "resampling land cover");
                resample_like(lc, elevation, 0)?
            };
            Some(landcover_cost_factor(&aligned, &params.landcover_costs))
        }
        None => None,
    };

    let cost = composite_cost(
        &slope_cost,
        landcover_cost.as_ref(),
        params.slope_weight,
        params.landcover_weight,
    )?;

    let (min, max, sum) = cost
        .data()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, s), &c| (lo.min(c), hi.max(c), s + c));
    info!(
        min = format_args!("{min:.2}"),
        max = format_args!("{max:.2}"),
        mean = format_args!("{:.2}", sum / cost.len().max(1) as f64),
        "cost surface ready"
    );

    Ok(CostSurface {
        slope,
        slope_cost,
        landcover_cost,
        cost,
    })
}

/// Cost surface builder as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct CostSurfaceBuilder;

impl Algorithm for CostSurfaceBuilder {
    type Input = (Raster<f64>, Option<Raster<i32>>);
    type Output = CostSurface;
    type Params = CostSurfaceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Cost Surface"
    }

    fn description(&self) -> &'static str {
        "Composite slope and land-cover traversal cost"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (elevation, landcover) = input;
        cost_surface(&elevation, landcover.as_ref(), &params)
    }
}
