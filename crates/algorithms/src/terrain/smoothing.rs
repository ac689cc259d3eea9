//! NaN-aware Gaussian smoothing
//!
//! Used to suppress elevation-sampling noise in slope before it is classified
//! into traversal costs.

use crate::maybe_rayon::*;
use unreach_core::raster::Raster;
use unreach_core::{Error, Result};

/// Parameters for Gaussian smoothing
#[derive(Debug, Clone)]
pub struct GaussianSmoothingParams {
    /// Standard deviation in cell units (default 1.0)
    pub sigma: f64,
    /// Kernel radius in cells. 0 means `ceil(4 * sigma)`.
    pub radius: usize,
}

impl Default for GaussianSmoothingParams {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            radius: 0,
        }
    }
}

impl GaussianSmoothingParams {
    fn effective_radius(&self) -> usize {
        if self.radius == 0 {
            (4.0 * self.sigma).ceil().max(1.0) as usize
        } else {
            self.radius
        }
    }
}

/// Normalized `(2r+1)^2` Gaussian kernel, row-major
fn gaussian_kernel(radius: usize, sigma: f64) -> Vec<f64> {
    let r = radius as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-r..=r)
        .flat_map(|dr| (-r..=r).map(move |dc| (-((dr * dr + dc * dc) as f64) / two_sigma_sq).exp()))
        .collect();

    let sum: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Apply a Gaussian filter to a raster.
///
/// Invalid cells stay invalid and do not contribute to their neighbors; the
/// weights of the remaining cells (and of cells cut off by the raster edge)
/// are renormalized so the filter never darkens borders or holes.
pub fn gaussian_smoothing(raster: &Raster<f64>, params: GaussianSmoothingParams) -> Result<Raster<f64>> {
    if !(params.sigma > 0.0) || !params.sigma.is_finite() {
        return Err(Error::invalid_parameter("sigma", params.sigma, "must be positive"));
    }

    let (rows, cols) = raster.shape();
    let radius = params.effective_radius();
    let r = radius as isize;
    let size = 2 * radius + 1;
    let kernel = gaussian_kernel(radius, params.sigma);
    let data = raster.data();
    let is_valid = |v: f64| !raster.is_nodata(v);

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                if !is_valid(data[(row, col)]) {
                    continue;
                }

                let mut sum = 0.0;
                let mut wsum = 0.0;

                for dr in -r..=r {
                    let nr = row as isize + dr;
                    if nr < 0 || nr as usize >= rows {
                        continue;
                    }

                    for dc in -r..=r {
                        let nc = col as isize + dc;
                        if nc < 0 || nc as usize >= cols {
                            continue;
                        }

                        let z = data[(nr as usize, nc as usize)];
                        if !is_valid(z) {
                            continue;
                        }

                        let w = kernel[(dr + r) as usize * size + (dc + r) as usize];
                        sum += z * w;
                        wsum += w;
                    }
                }

                row_data[col] = sum / wsum;
            }
            row_data
        })
        .collect();

    raster.derive(output_data, Some(f64::NAN))
}
