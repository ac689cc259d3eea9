//! Structured results of an analysis run

use std::fmt;

use serde::{Deserialize, Serialize};
use unreach_core::Grid;

use crate::distance::DistanceMode;
use crate::extremum::Extremum;
use crate::statistics::DistanceStatistics;

/// A reported remote cell, located on the grid and in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreachablePoint {
    /// 1-based rank; the most remote point is rank 1
    pub rank: usize,
    pub row: usize,
    pub col: usize,
    /// Projected coordinates of the cell center
    pub x: f64,
    pub y: f64,
    pub distance_m: f64,
    pub distance_km: f64,
    /// WGS84, absent when the grid CRS has no supported inverse projection
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UnreachablePoint {
    pub fn locate(grid: &Grid, rank: usize, peak: &Extremum) -> Self {
        let (x, y) = grid.pixel_to_world(peak.row, peak.col);
        let lonlat = grid.to_geographic(x, y);
        Self {
            rank,
            row: peak.row,
            col: peak.col,
            x,
            y,
            distance_m: peak.value,
            distance_km: peak.value / 1000.0,
            latitude: lonlat.map(|(_, lat)| lat),
            longitude: lonlat.map(|(lon, _)| lon),
        }
    }
}

/// An elevation sample located like [`UnreachablePoint`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub elevation_m: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ElevationPoint {
    pub fn locate(grid: &Grid, sample: &Extremum) -> Self {
        let (x, y) = grid.pixel_to_world(sample.row, sample.col);
        let lonlat = grid.to_geographic(x, y);
        Self {
            row: sample.row,
            col: sample.col,
            x,
            y,
            elevation_m: sample.value,
            latitude: lonlat.map(|(_, lat)| lat),
            longitude: lonlat.map(|(lon, _)| lon),
        }
    }
}

/// Highest and lowest eligible terrain in the region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationSummary {
    pub highest: ElevationPoint,
    pub lowest: ElevationPoint,
}

/// Non-fatal degradations met during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Cost-weighted distance was requested but no cost surface could be
    /// supplied or built; Euclidean distance was used instead
    CostSurfaceUnavailable,
    /// Fewer ranked points than requested satisfy the separation constraint
    TopNExhausted { requested: usize, found: usize },
    /// The cost surface had cells below the 1.0 baseline; they were
    /// treated as impassable
    SubUnitCost { cells: usize },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::CostSurfaceUnavailable => {
                write!(f, "no cost surface available, fell back to euclidean distance")
            }
            AnalysisWarning::TopNExhausted { requested, found } => {
                write!(f, "only {found} of {requested} requested remote points found")
            }
            AnalysisWarning::SubUnitCost { cells } => {
                write!(f, "{cells} cost surface cells below 1.0 treated as impassable")
            }
        }
    }
}

/// Settings that shaped the ranked results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    pub top_n: usize,
    pub min_separation_km: f64,
    pub exclude_landcover: Vec<i32>,
}

/// Everything a run found, as plain serializable data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotenessReport {
    /// CRS identifier of the grid, e.g. `"EPSG:5070"`
    pub crs: String,
    pub resolution_m: f64,
    pub width: usize,
    pub height: usize,
    pub requested_mode: DistanceMode,
    pub distance_mode: DistanceMode,
    pub settings: RankingSettings,
    pub most_remote: Option<UnreachablePoint>,
    pub ranked: Vec<UnreachablePoint>,
    pub statistics: DistanceStatistics,
    pub elevation: Option<ElevationSummary>,
    pub warnings: Vec<AnalysisWarning>,
}
