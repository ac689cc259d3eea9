//! Terrain-derived traversal cost
//!
//! - Slope: central-difference gradient magnitude in degrees
//! - Smoothing: NaN-aware Gaussian filter applied to slope
//! - Cost surface: slope and land-cover multipliers composited into one grid

mod cost_surface;
mod slope;
mod smoothing;

pub use cost_surface::{
    composite_cost, cost_surface, landcover_cost_factor, slope_cost_factor, CostSurface,
    CostSurfaceBuilder, CostSurfaceParams, LandcoverCostTable, SlopeCostParams, SLOPE_BREAKPOINTS,
};
pub use slope::{slope_degrees, Slope, SlopeParams};
pub use smoothing::{gaussian_smoothing, GaussianSmoothingParams};
