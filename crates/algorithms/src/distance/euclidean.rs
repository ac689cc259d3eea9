//! Exact Euclidean distance transform
//!
//! Felzenszwalb & Huttenlocher (2012), "Distance Transforms of Sampled
//! Functions": the squared distance to the nearest source is the lower
//! envelope of parabolas rooted at each source, computed separably with one
//! pass down every column and one pass along every row. Linear in the number
//! of cells and exact, unlike chamfer approximations.

use crate::maybe_rayon::*;
use unreach_core::raster::Raster;
use unreach_core::{Algorithm, Error, Result};

/// Parameters for the Euclidean distance transform
#[derive(Debug, Clone)]
pub struct EuclideanDistanceParams {
    /// Cell size in meters (default 1.0)
    pub resolution: f64,
}

impl Default for EuclideanDistanceParams {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

/// Euclidean distance algorithm
#[derive(Debug, Clone, Default)]
pub struct EuclideanDistance;

impl Algorithm for EuclideanDistance {
    type Input = Raster<u8>;
    type Output = Raster<f64>;
    type Params = EuclideanDistanceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Euclidean Distance"
    }

    fn description(&self) -> &'static str {
        "Exact straight-line distance to the nearest source cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        euclidean_distance(&input, params.resolution)
    }
}

/// One-dimensional squared distance transform of `f` into `out`.
///
/// Only finite entries of `f` root a parabola. If none do, `out` is all
/// infinity.
fn lower_envelope(f: &[f64], out: &mut [f64]) {
    let n = f.len();
    // Roots of the parabolas in the envelope and the left edge of each one's span
    let mut v: Vec<usize> = Vec::with_capacity(n);
    let mut z: Vec<f64> = Vec::with_capacity(n);

    let intersect = |p: usize, q: usize| -> f64 {
        let (pf, qf) = (p as f64, q as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf))
    };

    for q in (0..n).filter(|&q| f[q].is_finite()) {
        let mut s = f64::NEG_INFINITY;
        while let (Some(&p), Some(&zp)) = (v.last(), z.last()) {
            s = intersect(p, q);
            if s <= zp {
                v.pop();
                z.pop();
                s = f64::NEG_INFINITY;
            } else {
                break;
            }
        }
        v.push(q);
        z.push(s);
    }

    if v.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, d) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < v.len() && z[k + 1] < qf {
            k += 1;
        }
        let dq = qf - v[k] as f64;
        *d = dq * dq + f[v[k]];
    }
}

/// Distance in meters from every cell to the nearest source cell.
///
/// `sources` is a mask where nonzero marks a source. Source cells get exactly
/// 0. The output keeps the mask's transform and CRS, with NaN as nodata.
pub fn euclidean_distance(sources: &Raster<u8>, resolution: f64) -> Result<Raster<f64>> {
    if !(resolution > 0.0) || !resolution.is_finite() {
        return Err(Error::invalid_parameter("resolution", resolution, "must be positive"));
    }
    if sources.count_where(|v| v != 0) == 0 {
        return Err(Error::NoSourceCells);
    }

    let (rows, cols) = sources.shape();
    let mask = sources.data();

    // Column pass: squared vertical distance to the nearest source in each column
    let columns: Vec<Vec<f64>> = (0..cols)
        .into_par_iter()
        .map(|col| {
            let f: Vec<f64> = (0..rows)
                .map(|row| if mask[(row, col)] != 0 { 0.0 } else { f64::INFINITY })
                .collect();
            let mut out = vec![0.0; rows];
            lower_envelope(&f, &mut out);
            out
        })
        .collect();

    // Row pass over the column result
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let f: Vec<f64> = columns.iter().map(|column| column[row]).collect();
            let mut out = vec![0.0; cols];
            lower_envelope(&f, &mut out);
            out.into_iter().map(|d2| d2.sqrt() * resolution).collect::<Vec<f64>>()
        })
        .collect();

    sources.derive(data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mask(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Raster<u8> {
        let mut m = Raster::new(rows, cols);
        for &(r, c) in cells {
            m.set(r, c, 1).unwrap();
        }
        m
    }

    #[test]
    fn test_envelope_1d() {
        let inf = f64::INFINITY;
        let mut out = vec![0.0; 6];
        lower_envelope(&[inf, 0.0, inf, inf, inf, 0.0], &mut out);
        assert_eq!(out, vec![1.0, 0.0, 1.0, 4.0, 1.0, 0.0]);

        lower_envelope(&[inf; 6], &mut out);
        assert!(out.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_single_source_matches_hypot() {
        let m = mask(9, 13, &[(4, 7)]);
        let field = euclidean_distance(&m, 250.0).unwrap();
        for r in 0..9 {
            for c in 0..13 {
                let expected = 250.0 * ((r as f64 - 4.0).hypot(c as f64 - 7.0));
                assert_relative_eq!(field.get(r, c).unwrap(), expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_corner_scenario() {
        let m = mask(4, 4, &[(0, 0)]);
        let field = euclidean_distance(&m, 100.0).unwrap();
        assert_relative_eq!(field.get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(field.get(3, 3).unwrap(), 100.0 * 18.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(field.get(0, 3).unwrap(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multiple_sources_take_nearest() {
        let m = mask(5, 20, &[(2, 0), (2, 19)]);
        let field = euclidean_distance(&m, 1.0).unwrap();
        assert_relative_eq!(field.get(2, 0).unwrap(), 0.0);
        assert_relative_eq!(field.get(2, 19).unwrap(), 0.0);
        assert_relative_eq!(field.get(2, 9).unwrap(), 9.0, epsilon = 1e-12);
        assert_relative_eq!(field.get(2, 10).unwrap(), 9.0, epsilon = 1e-12);
        assert_relative_eq!(field.get(0, 5).unwrap(), 29.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_matches_brute_force() {
        let sources = [(0, 3), (5, 5), (7, 1), (2, 10)];
        let m = mask(8, 12, &sources);
        let field = euclidean_distance(&m, 30.0).unwrap();
        for r in 0..8 {
            for c in 0..12 {
                let expected = sources
                    .iter()
                    .map(|&(sr, sc)| (r as f64 - sr as f64).hypot(c as f64 - sc as f64))
                    .fold(f64::INFINITY, f64::min)
                    * 30.0;
                assert_relative_eq!(field.get(r, c).unwrap(), expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let m = mask(4, 4, &[]);
        assert!(matches!(euclidean_distance(&m, 1.0), Err(Error::NoSourceCells)));
    }

    #[test]
    fn test_algorithm_trait() {
        let m = mask(3, 3, &[(1, 1)]);
        let field = EuclideanDistance
            .execute(m, EuclideanDistanceParams { resolution: 10.0 })
            .unwrap();
        assert_relative_eq!(field.get(0, 1).unwrap(), 10.0, epsilon = 1e-12);
    }
}
