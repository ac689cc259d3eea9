//! # Unreach Core
//!
//! Core types for remoteness analysis over gridded regions.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced grid of cell values
//! - `GeoTransform`: Affine pixel <-> world mapping
//! - `CRS`: Coordinate reference system with inverse projection to WGS84
//! - `Grid`: Analysis grid derived from a bounding region and a resolution
//! - Algorithm trait for consistent stage APIs

pub mod crs;
pub mod error;
pub mod grid;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use grid::{Bounds, Grid};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Bounds, Grid};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for analysis stages.
///
/// Stages are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the stage
    type Input;
    /// Output type for the stage
    type Output;
    /// Parameters controlling stage behavior
    type Params: Default;
    /// Error type for stage execution
    type Error: std::error::Error;

    /// Returns the stage name
    fn name(&self) -> &'static str;

    /// Returns a description of what the stage does
    fn description(&self) -> &'static str;

    /// Execute the stage
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
