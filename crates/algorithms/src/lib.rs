//! # Unreach Algorithms
//!
//! Stages of a most-remote-point analysis.
//!
//! ## Modules
//!
//! - **terrain**: Slope, smoothing, composite traversal-cost surface
//! - **resample**: Nearest-neighbor alignment of layers onto the analysis grid
//! - **distance**: Exact Euclidean and cost-weighted distance fields
//! - **masking**: Region boundary and destination eligibility
//! - **extremum**: Most remote cell, separated top-N, elevation extremes
//! - **statistics**: Distance field summary
//! - **analysis**: Configured end-to-end pipeline and report

pub mod analysis;
pub mod distance;
pub mod extremum;
pub mod masking;
pub(crate) mod maybe_rayon;
pub mod resample;
pub mod statistics;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        Analysis, AnalysisConfig, AnalysisInputs, AnalysisOutput, AnalysisWarning,
        RemotenessReport, UnreachablePoint,
    };
    pub use crate::distance::{distance_field, DistanceMode, DistanceOutcome};
    pub use crate::extremum::{elevation_extremes, find_maximum, find_top_n, Extremum, TopN};
    pub use crate::masking::{apply_boundary, apply_eligibility, eligibility_mask, mask_coverage};
    pub use crate::resample::{resample_like, resample_to_grid};
    pub use crate::statistics::{summarize, DistanceStatistics, DistanceSummary};
    pub use crate::terrain::{cost_surface, CostSurfaceParams, LandcoverCostTable, SlopeCostParams};
    pub use unreach_core::prelude::*;
}
