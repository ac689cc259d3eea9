//! Summary statistics of a distance field

use serde::{Deserialize, Serialize};
use tracing::debug;
use unreach_core::raster::Raster;

/// Aggregates over the finite cells of a distance field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub max_m: f64,
    pub mean_m: f64,
    pub median_m: f64,
    /// Population standard deviation
    pub std_m: f64,
    pub max_km: f64,
    pub mean_km: f64,
    pub median_km: f64,
    pub std_km: f64,
}

/// Cell counts plus aggregates, if any cell is valid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceStatistics {
    pub total_cells: usize,
    pub valid_cells: usize,
    pub summary: Option<DistanceSummary>,
}

/// Summarize a (boundary-masked) distance field.
///
/// NaN and infinite cells are counted in `total_cells` but never enter an
/// aggregate.
pub fn summarize(field: &Raster<f64>) -> DistanceStatistics {
    let mut vals: Vec<f64> = field.data().iter().copied().filter(|v| v.is_finite()).collect();
    let total_cells = field.len();
    let valid_cells = vals.len();

    let summary = if vals.is_empty() {
        None
    } else {
        let count = vals.len() as f64;
        let mean = vals.iter().sum::<f64>() / count;
        let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
        let std = var.sqrt();

        vals.sort_by(|a, b| a.total_cmp(b));
        let n = vals.len();
        let median = if n % 2 == 0 {
            (vals[n / 2 - 1] + vals[n / 2]) / 2.0
        } else {
            vals[n / 2]
        };
        let max = vals[n - 1];

        Some(DistanceSummary {
            max_m: max,
            mean_m: mean,
            median_m: median,
            std_m: std,
            max_km: max / 1000.0,
            mean_km: mean / 1000.0,
            median_km: median / 1000.0,
            std_km: std / 1000.0,
        })
    };

    debug!(total_cells, valid_cells, "distance statistics computed");
    DistanceStatistics {
        total_cells,
        valid_cells,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_ignores_invalid_cells() {
        let field = Raster::from_vec(
            vec![1000.0, f64::NAN, 2000.0, 3000.0, f64::INFINITY, 4000.0],
            2,
            3,
        )
        .unwrap();
        let stats = summarize(&field);
        assert_eq!(stats.total_cells, 6);
        assert_eq!(stats.valid_cells, 4);

        let s = stats.summary.unwrap();
        assert_relative_eq!(s.max_m, 4000.0);
        assert_relative_eq!(s.mean_m, 2500.0);
        assert_relative_eq!(s.median_m, 2500.0);
        assert_relative_eq!(s.std_m, 1250.0_f64.sqrt() * 1000.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(s.mean_km, 2.5);
        assert_relative_eq!(s.std_km, s.std_m / 1000.0);
    }

    #[test]
    fn test_odd_median() {
        let field = Raster::from_vec(vec![5.0, 1.0, 3.0], 1, 3).unwrap();
        let s = summarize(&field).summary.unwrap();
        assert_relative_eq!(s.median_m, 3.0);
        assert_relative_eq!(s.std_m, (8.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_all_invalid_has_no_summary() {
        let field = Raster::filled(3, 3, f64::NAN);
        let stats = summarize(&field);
        assert_eq!(stats.total_cells, 9);
        assert_eq!(stats.valid_cells, 0);
        assert!(stats.summary.is_none());
    }
}
