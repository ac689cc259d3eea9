//! End-to-end remoteness analysis
//!
//! Runs the stages in order over one grid:
//!
//! 1. cost surface (cost-weighted mode only), aligned to the grid
//! 2. distance field from the source mask
//! 3. boundary mask
//! 4. eligibility mask from land cover
//! 5. most remote point, ranked points, statistics, elevation extremes

mod config;
mod report;

pub use config::AnalysisConfig;
pub use report::{
    AnalysisWarning, ElevationPoint, ElevationSummary, RankingSettings, RemotenessReport,
    UnreachablePoint,
};

use std::time::Instant;

use tracing::{debug, info, warn};
use unreach_core::raster::{Raster, RasterElement};
use unreach_core::{Error, Grid, Result};

use crate::distance::{distance_field, DistanceMode};
use crate::extremum::{elevation_extremes, find_maximum, find_top_n};
use crate::masking::{apply_boundary, eligibility_mask};
use crate::resample::resample_to_grid;
use crate::statistics::summarize;
use crate::terrain::cost_surface;

/// Layers available to one run. Only the grid and the source mask are required.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInputs<'a> {
    pub grid: &'a Grid,
    /// Nonzero on cells touched by the reference features; must match the grid shape
    pub sources: &'a Raster<u8>,
    /// Nonzero inside the region of interest; must match the grid shape
    pub boundary: Option<&'a Raster<u8>>,
    pub elevation: Option<&'a Raster<f64>>,
    /// Land-cover class codes
    pub landcover: Option<&'a Raster<i32>>,
    /// Precomputed cost surface, used instead of building one from elevation
    pub cost_surface: Option<&'a Raster<f64>>,
}

impl<'a> AnalysisInputs<'a> {
    pub fn new(grid: &'a Grid, sources: &'a Raster<u8>) -> Self {
        Self {
            grid,
            sources,
            boundary: None,
            elevation: None,
            landcover: None,
            cost_surface: None,
        }
    }

    pub fn with_boundary(mut self, boundary: &'a Raster<u8>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_elevation(mut self, elevation: &'a Raster<f64>) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_landcover(mut self, landcover: &'a Raster<i32>) -> Self {
        self.landcover = Some(landcover);
        self
    }

    pub fn with_cost_surface(mut self, cost: &'a Raster<f64>) -> Self {
        self.cost_surface = Some(cost);
        self
    }
}

/// Rasters and report produced by a run
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Boundary-masked distance in meters; NaN outside the region or unreachable
    pub distance_field: Raster<f64>,
    /// Cost surface on the grid, when cost-weighted distance was computed
    pub cost_surface: Option<Raster<f64>>,
    pub report: RemotenessReport,
}

/// A configured remoteness analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
}

/// Put `raster` on the grid lattice, resampling by nearest neighbor if needed.
/// A layer in a different known CRS is rejected.
fn align<T: RasterElement>(raster: &Raster<T>, grid: &Grid, fill: T, layer: &str) -> Result<Raster<T>> {
    if let Some(crs) = raster.crs() {
        if !crs.is_equivalent(grid.crs()) {
            return Err(Error::CrsMismatch(crs.identifier(), grid.crs().identifier()));
        }
    }
    if grid.is_aligned(raster) {
        let mut aligned = raster.clone();
        aligned.set_crs(Some(grid.crs().clone()));
        return Ok(aligned);
    }
    debug!(layer, from = ?raster.shape(), to = ?grid.shape(), "resampling to grid");
    resample_to_grid(raster, grid, fill)
}

/// Cells with a finite multiplier below the 1.0 baseline
fn impassable_cells(cost: &Raster<f64>) -> usize {
    cost.count_where(|c| c.is_finite() && c < 1.0)
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Cost surface on the grid, or `None` if there is nothing to build it from
    fn grid_cost_surface(&self, inputs: &AnalysisInputs<'_>) -> Result<Option<Raster<f64>>> {
        if let Some(cost) = inputs.cost_surface {
            return align(cost, inputs.grid, f64::NAN, "cost surface").map(Some);
        }
        let Some(elevation) = inputs.elevation else {
            return Ok(None);
        };
        let surface = cost_surface(elevation, inputs.landcover, &self.config.cost)?;
        align(&surface.cost, inputs.grid, f64::NAN, "cost surface").map(Some)
    }

    /// Run every stage over `inputs`
    pub fn run(&self, inputs: AnalysisInputs<'_>) -> Result<AnalysisOutput> {
        let config = &self.config;
        let grid = inputs.grid;
        let started = Instant::now();

        if !grid.crs().is_equivalent(&config.crs) {
            return Err(Error::CrsMismatch(grid.crs().identifier(), config.crs.identifier()));
        }
        if (grid.resolution() - config.resolution_m).abs() > 1e-9 * config.resolution_m {
            warn!(
                grid = grid.resolution(),
                configured = config.resolution_m,
                "grid resolution differs from configuration, using the grid's"
            );
        }
        grid.check_shape(inputs.sources)?;
        if let Some(boundary) = inputs.boundary {
            grid.check_shape(boundary)?;
        }

        info!(
            width = grid.width(),
            height = grid.height(),
            resolution_m = grid.resolution(),
            crs = %grid.crs(),
            mode = %config.distance_mode,
            "starting remoteness analysis"
        );

        let mut warnings = Vec::new();

        let cost = match config.distance_mode {
            DistanceMode::CostWeighted => self.grid_cost_surface(&inputs)?,
            DistanceMode::Euclidean => None,
        };
        if let Some(cost) = &cost {
            let cells = impassable_cells(cost);
            if cells > 0 {
                warn!(cells, "cost surface has multipliers below 1.0, treating them as impassable");
                warnings.push(AnalysisWarning::SubUnitCost { cells });
            }
        }

        let outcome = distance_field(config.distance_mode, inputs.sources, cost.as_ref(), grid.resolution())?;
        if outcome.fell_back {
            warnings.push(AnalysisWarning::CostSurfaceUnavailable);
        }

        let mut field = outcome.field;
        field.set_transform(*grid.transform());
        field.set_crs(Some(grid.crs().clone()));
        let field = match inputs.boundary {
            Some(boundary) => apply_boundary(&field, boundary)?,
            None => field,
        };

        let eligibility = match inputs.landcover {
            Some(lc) => {
                let lc = align(lc, grid, 0, "land cover")?;
                Some(eligibility_mask(&lc, &config.exclude_landcover))
            }
            None => None,
        };
        let eligibility = eligibility.as_ref();

        let most_remote = find_maximum(&field, eligibility)?.map(|peak| UnreachablePoint::locate(grid, 1, &peak));
        match &most_remote {
            Some(p) => info!(
                row = p.row,
                col = p.col,
                distance_km = format_args!("{:.2}", p.distance_km),
                "most remote point found"
            ),
            None => warn!("no eligible finite cell in the distance field"),
        }

        let top = find_top_n(
            &field,
            eligibility,
            config.top_n,
            config.min_separation_km,
            grid.resolution(),
        )?;
        if top.exhausted {
            warnings.push(AnalysisWarning::TopNExhausted {
                requested: config.top_n,
                found: top.peaks.len(),
            });
        }
        let ranked = top
            .peaks
            .iter()
            .enumerate()
            .map(|(i, peak)| UnreachablePoint::locate(grid, i + 1, peak))
            .collect();

        let statistics = summarize(&field);

        let elevation = match inputs.elevation {
            Some(dem) => {
                let mut dem = align(dem, grid, f64::NAN, "elevation")?;
                if let Some(boundary) = inputs.boundary {
                    dem = apply_boundary(&dem, boundary)?;
                }
                elevation_extremes(&dem, eligibility)?.map(|ext| ElevationSummary {
                    highest: ElevationPoint::locate(grid, &ext.highest),
                    lowest: ElevationPoint::locate(grid, &ext.lowest),
                })
            }
            None => None,
        };

        debug!(elapsed = ?started.elapsed(), warnings = warnings.len(), "remoteness analysis finished");

        let report = RemotenessReport {
            crs: grid.crs().identifier(),
            resolution_m: grid.resolution(),
            width: grid.width(),
            height: grid.height(),
            requested_mode: config.distance_mode,
            distance_mode: outcome.mode_used,
            settings: RankingSettings {
                top_n: config.top_n,
                min_separation_km: config.min_separation_km,
                exclude_landcover: config.exclude_landcover.clone(),
            },
            most_remote,
            ranked,
            statistics,
            elevation,
            warnings,
        };

        Ok(AnalysisOutput {
            distance_field: field,
            cost_surface: cost,
            report,
        })
    }
}
