//! Raster data structures
//!
//! Invalid cells in `f64` rasters are NaN everywhere in Unreach: distance
//! fields, cost surfaces, slope and smoothed elevation all use it for cells
//! outside the region, without data, or unreachable. Masks are `Raster<u8>`
//! where any nonzero value means "set".

mod element;
mod geotransform;
mod grid;
mod neighborhood;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use neighborhood::d8;
