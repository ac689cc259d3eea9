//! Extremum extraction over distance and elevation fields
//!
//! Only finite values are candidates: NaN marks masked or unreachable cells
//! and ±infinity is never reported. Ties go to the first cell in row-major
//! order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unreach_core::raster::Raster;
use unreach_core::{Error, Result};

/// Elevations outside this range (meters) are treated as sensor artifacts
pub const PLAUSIBLE_ELEVATION_M: (f64, f64) = (-100.0, 10_000.0);

/// A cell and its value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

/// Result of a top-N search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopN {
    /// Peaks in descending order of value
    pub peaks: Vec<Extremum>,
    /// Fewer than the requested number of peaks could be found
    pub exhausted: bool,
}

/// Highest and lowest plausible elevation in a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationExtremes {
    pub highest: Extremum,
    pub lowest: Extremum,
}

fn check_mask(field: &Raster<f64>, mask: Option<&Raster<u8>>) -> Result<()> {
    match mask {
        Some(m) => field.ensure_same_shape(m),
        None => Ok(()),
    }
}

/// Row-major scan keeping the first cell that `better` prefers
fn scan(
    field: &Raster<f64>,
    mask: Option<&Raster<u8>>,
    accept: impl Fn(f64) -> bool,
    better: impl Fn(f64, f64) -> bool,
) -> Option<Extremum> {
    let mut best: Option<Extremum> = None;
    for ((row, col), &value) in field.data().indexed_iter() {
        if !value.is_finite() || !accept(value) {
            continue;
        }
        if let Some(m) = mask {
            if m.data()[(row, col)] == 0 {
                continue;
            }
        }
        if best.map_or(true, |b| better(value, b.value)) {
            best = Some(Extremum { row, col, value });
        }
    }
    best
}

/// Largest finite, eligible value of `field`
pub fn find_maximum(field: &Raster<f64>, eligibility: Option<&Raster<u8>>) -> Result<Option<Extremum>> {
    check_mask(field, eligibility)?;
    Ok(scan(field, eligibility, |_| true, |a, b| a > b))
}

/// Up to `n` spatially separated maxima by greedy non-maximum suppression.
///
/// Each round takes the current maximum, then invalidates every cell closer
/// than `min_separation_km` to it (and the cell itself). The search stops
/// early once no positive value remains, since zero-distance cells are
/// sources rather than destinations. Greedy selection is not guaranteed to
/// find the set of `n` points with the largest total value.
pub fn find_top_n(
    field: &Raster<f64>,
    eligibility: Option<&Raster<u8>>,
    n: usize,
    min_separation_km: f64,
    resolution_m: f64,
) -> Result<TopN> {
    check_mask(field, eligibility)?;
    if !(resolution_m > 0.0) || !resolution_m.is_finite() {
        return Err(Error::invalid_parameter("resolution_m", resolution_m, "must be positive"));
    }
    if !(min_separation_km >= 0.0) || !min_separation_km.is_finite() {
        return Err(Error::invalid_parameter(
            "min_separation_km",
            min_separation_km,
            "must be finite and non-negative",
        ));
    }

    let (rows, cols) = field.shape();
    let radius = min_separation_km * 1000.0 / resolution_m;
    // No cell is farther than the larger dimension
    let reach = radius.ceil().min(rows.max(cols) as f64) as usize;
    let radius_sq = radius * radius;

    let mut working = field.clone();
    let mut peaks = Vec::with_capacity(n);

    while peaks.len() < n {
        let Some(peak) = scan(&working, eligibility, |_| true, |a, b| a > b) else {
            break;
        };
        if peak.value <= 0.0 {
            break;
        }
        peaks.push(peak);

        let data = working.data_mut();
        data[(peak.row, peak.col)] = f64::NAN;
        let (r0, r1) = (peak.row.saturating_sub(reach), peak.row.saturating_add(reach).min(rows - 1));
        let (c0, c1) = (peak.col.saturating_sub(reach), peak.col.saturating_add(reach).min(cols - 1));
        for r in r0..=r1 {
            let dr = r as f64 - peak.row as f64;
            for c in c0..=c1 {
                let dc = c as f64 - peak.col as f64;
                if dr * dr + dc * dc < radius_sq {
                    data[(r, c)] = f64::NAN;
                }
            }
        }
    }

    let exhausted = peaks.len() < n;
    if exhausted {
        warn!(requested = n, found = peaks.len(), "ran out of eligible cells for top-N");
    } else {
        debug!(found = peaks.len(), radius_px = radius, "top-N complete");
    }
    Ok(TopN { peaks, exhausted })
}

/// Highest and lowest plausible elevation among eligible cells
pub fn elevation_extremes(dem: &Raster<f64>, eligibility: Option<&Raster<u8>>) -> Result<Option<ElevationExtremes>> {
    check_mask(dem, eligibility)?;
    let (lo, hi) = PLAUSIBLE_ELEVATION_M;
    let plausible = |v: f64| !dem.is_nodata(v) && (lo..=hi).contains(&v);

    let highest = scan(dem, eligibility, plausible, |a, b| a > b);
    let lowest = scan(dem, eligibility, plausible, |a, b| a < b);
    Ok(highest.zip(lowest).map(|(highest, lowest)| ElevationExtremes { highest, lowest }))
}
