//! Slope from elevation by central differences
//!
//! Gradients are taken along each axis with second-order central differences
//! in the interior and first-order one-sided differences at the raster edge or
//! next to a nodata cell, each scaled by that axis's own cell size.

use crate::maybe_rayon::*;
use unreach_core::raster::Raster;
use unreach_core::{Algorithm, Error, Result};

/// Parameters for slope calculation
#[derive(Debug, Clone)]
pub struct SlopeParams {
    /// Multiplier converting horizontal units to elevation units (default 1.0)
    pub z_factor: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self { z_factor: 1.0 }
    }
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Slope in degrees from a DEM using central-difference gradients"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope_degrees(&input, params)
    }
}

/// Derivative along one axis given the two neighbors (if valid) of `center`
#[inline]
fn axis_derivative(before: Option<f64>, center: f64, after: Option<f64>, spacing: f64) -> f64 {
    match (before, after) {
        (Some(b), Some(a)) => (a - b) / (2.0 * spacing),
        (None, Some(a)) => (a - center) / spacing,
        (Some(b), None) => (center - b) / spacing,
        (None, None) => 0.0,
    }
}

/// Calculate slope in degrees from a DEM.
///
/// `slope = atan(hypot(dz/dx, dz/dy))`, with `dx` and `dy` the absolute pixel
/// width and height of the DEM's transform. Nodata cells (NaN or the declared
/// nodata value) produce NaN; a cell with no valid neighbor along an axis has
/// zero gradient along it.
pub fn slope_degrees(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let (dx, dy) = dem.transform().pixel_size();
    if !(dx > 0.0 && dy > 0.0) || !(params.z_factor > 0.0) {
        return Err(Error::invalid_parameter(
            "cell size",
            format!("{dx}x{dy} (z_factor {})", params.z_factor),
            "pixel size and z-factor must be positive",
        ));
    }
    let dx = dx * params.z_factor;
    let dy = dy * params.z_factor;

    let valid = |r: usize, c: usize| -> Option<f64> {
        let v = unsafe { dem.get_unchecked(r, c) };
        (!dem.is_nodata(v)).then_some(v)
    };

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for col in 0..cols {
                let Some(z) = valid(row, col) else {
                    continue;
                };

                let west = if col > 0 { valid(row, col - 1) } else { None };
                let east = if col + 1 < cols { valid(row, col + 1) } else { None };
                let north = if row > 0 { valid(row - 1, col) } else { None };
                let south = if row + 1 < rows { valid(row + 1, col) } else { None };

                let dz_dx = axis_derivative(west, z, east, dx);
                let dz_dy = axis_derivative(north, z, south, dy);

                row_data[col] = dz_dx.hypot(dz_dy).atan().to_degrees();
            }

            row_data
        })
        .collect();

    dem.derive(output_data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use unreach_core::GeoTransform;

    fn plane(rows: usize, cols: usize, cell: f64, f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
        let mut dem = Raster::new(rows, cols);
        dem.set_transform(GeoTransform::new(0.0, rows as f64 * cell, cell, -cell));
        for row in 0..rows {
            for col in 0..cols {
                dem.set(row, col, f(row, col)).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_slope_flat() {
        let dem = plane(10, 10, 30.0, |_, _| 100.0);
        let result = slope_degrees(&dem, SlopeParams::default()).unwrap();
        assert!(result.data().iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_slope_45_degrees_everywhere() {
        // Rise equals run along columns, edges included
        let dem = plane(6, 8, 10.0, |_, c| c as f64 * 10.0);
        let result = slope_degrees(&dem, SlopeParams::default()).unwrap();
        for v in result.data().iter() {
            assert_relative_eq!(*v, 45.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_slope_uses_per_axis_cell_size() {
        let mut dem = plane(5, 5, 1.0, |r, _| r as f64 * 20.0);
        // 20 m cells vertically, 5 m horizontally: dz/dy = 1
        dem.set_transform(GeoTransform::new(0.0, 100.0, 5.0, -20.0));
        let result = slope_degrees(&dem, SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nodata_propagates_only_to_center() {
        let mut dem = plane(5, 5, 10.0, |_, c| c as f64 * 10.0);
        dem.set_nodata(Some(-9999.0));
        dem.set(2, 2, -9999.0).unwrap();

        let result = slope_degrees(&dem, SlopeParams::default()).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        // Neighbors fall back to one-sided differences
        assert_relative_eq!(result.get(2, 1).unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(result.get(2, 3).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_algorithm_trait() {
        let dem = plane(4, 4, 1.0, |_, _| 0.0);
        let out = Slope.execute_default(dem).unwrap();
        assert_eq!(out.shape(), (4, 4));
        assert_eq!(Slope.name(), "Slope");
    }
}
