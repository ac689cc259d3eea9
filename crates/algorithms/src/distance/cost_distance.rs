//! Cost-weighted distance
//!
//! Accumulated traversal cost from the nearest source cell, by multi-source
//! Dijkstra over the 8-connected cell graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::warn;
use unreach_core::raster::{d8, Raster};
use unreach_core::{Algorithm, Error, Result};

/// Parameters for cost distance
#[derive(Debug, Clone)]
pub struct CostDistanceParams {
    /// Cell size in meters (default 1.0)
    pub resolution: f64,
}

impl Default for CostDistanceParams {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

/// State in the priority queue (min-heap via reversed ordering)
#[derive(Debug, Clone, PartialEq)]
struct State {
    cost: f64,
    index: usize,
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// A cell can be entered only with a finite multiplier of at least 1.0
#[inline]
fn passable(cost: f64) -> bool {
    cost >= 1.0 && cost.is_finite()
}

/// Effective distance in meters from every cell to the nearest source.
///
/// Moving into a cell costs that cell's multiplier times the step length
/// (1 orthogonally, sqrt(2) diagonally); the accumulated sum is scaled by
/// `resolution`. Source cells are 0 whatever their own cost. Cells with a NaN
/// or sub-1.0 multiplier are barriers and, like cells walled off by them,
/// come out NaN.
pub fn cost_distance(sources: &Raster<u8>, cost: &Raster<f64>, resolution: f64) -> Result<Raster<f64>> {
    if !(resolution > 0.0) || !resolution.is_finite() {
        return Err(Error::invalid_parameter("resolution", resolution, "must be positive"));
    }
    sources.ensure_same_shape(cost)?;
    let sub_unit = cost.count_where(|c| c.is_finite() && c < 1.0);
    if sub_unit > 0 {
        warn!(cells = sub_unit, "cost multipliers below 1.0 are impassable");
    }

    let (rows, cols) = sources.shape();
    let mut dist = vec![f64::INFINITY; rows * cols];
    let mut heap = BinaryHeap::new();

    for ((row, col), &v) in sources.data().indexed_iter() {
        if v != 0 {
            let index = row * cols + col;
            dist[index] = 0.0;
            heap.push(State { cost: 0.0, index });
        }
    }
    if heap.is_empty() {
        return Err(Error::NoSourceCells);
    }

    let cost = cost.data();
    while let Some(State { cost: acc, index }) = heap.pop() {
        if acc > dist[index] {
            continue;
        }
        let (row, col) = (index / cols, index % cols);

        for (dir, &step) in d8::DISTANCES.iter().enumerate() {
            let Some((nr, nc)) = d8::neighbor(row, col, dir, rows, cols) else {
                continue;
            };
            let multiplier = cost[(nr, nc)];
            if !passable(multiplier) {
                continue;
            }

            let next = acc + multiplier * step;
            let ni = nr * cols + nc;
            if next < dist[ni] {
                dist[ni] = next;
                heap.push(State { cost: next, index: ni });
            }
        }
    }

    let data = dist
        .into_iter()
        .map(|d| if d.is_finite() { d * resolution } else { f64::NAN })
        .collect();
    sources.derive(data, Some(f64::NAN))
}

/// Cost distance algorithm
#[derive(Debug, Clone, Default)]
pub struct CostDistance;

impl Algorithm for CostDistance {
    type Input = (Raster<u8>, Raster<f64>);
    type Output = Raster<f64>;
    type Params = CostDistanceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Cost Distance"
    }

    fn description(&self) -> &'static str {
        "Least accumulated traversal cost to the nearest source cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (sources, cost) = input;
        cost_distance(&sources, &cost, params.resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::SQRT_2;

    fn mask(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Raster<u8> {
        let mut m = Raster::new(rows, cols);
        for &(r, c) in cells {
            m.set(r, c, 1).unwrap();
        }
        m
    }

    #[test]
    fn test_cost_distance_basic() {
        let m = mask(10, 10, &[(0, 0)]);
        let cost = Raster::filled(10, 10, 1.0);
        let result = cost_distance(&m, &cost, 1.0).unwrap();

        assert_relative_eq!(result.get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(result.get(0, 1).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.get(1, 1).unwrap(), SQRT_2, epsilon = 1e-12);
        // Knight's move: one diagonal plus one orthogonal step
        assert_relative_eq!(result.get(1, 2).unwrap(), 1.0 + SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_cost_two() {
        let m = mask(4, 4, &[(0, 0)]);
        let cost = Raster::filled(4, 4, 2.0);
        let result = cost_distance(&m, &cost, 100.0).unwrap();
        assert_relative_eq!(result.get(0, 3).unwrap(), 600.0, epsilon = 1e-9);
        assert_relative_eq!(result.get(3, 3).unwrap(), 600.0 * SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_destination_cost_is_charged() {
        let m = mask(1, 3, &[(0, 0)]);
        let cost = Raster::from_vec(vec![50.0, 1.0, 3.0], 1, 3).unwrap();
        let result = cost_distance(&m, &cost, 1.0).unwrap();
        // The source's own cost is never paid
        assert_relative_eq!(result.get(0, 1).unwrap(), 1.0);
        assert_relative_eq!(result.get(0, 2).unwrap(), 4.0);
    }

    #[test]
    fn test_barrier_leaves_nan() {
        let m = mask(5, 5, &[(2, 0)]);
        let mut cost = Raster::filled(5, 5, 1.0);
        for row in 0..5 {
            cost.set(row, 2, f64::NAN).unwrap();
        }
        let result = cost_distance(&m, &cost, 1.0).unwrap();
        assert!(result.get(2, 4).unwrap().is_nan());
        assert!(result.get(0, 2).unwrap().is_nan());
        assert!(result.get(4, 1).unwrap().is_finite());
    }

    #[test]
    fn test_sub_unit_cost_is_impassable() {
        let m = mask(1, 3, &[(0, 0)]);
        let cost = Raster::from_vec(vec![1.0, 0.5, 1.0], 1, 3).unwrap();
        let result = cost_distance(&m, &cost, 1.0).unwrap();
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(result.get(0, 2).unwrap().is_nan());
    }

    #[test]
    fn test_raising_a_cost_never_shortens_paths() {
        let m = mask(7, 7, &[(0, 0), (6, 2)]);
        let base = Raster::filled(7, 7, 1.5);
        let before = cost_distance(&m, &base, 1.0).unwrap();

        let mut raised = base.clone();
        raised.set(3, 3, 9.0).unwrap();
        let after = cost_distance(&m, &raised, 1.0).unwrap();

        for (a, b) in after.data().iter().zip(before.data().iter()) {
            assert!(*a >= *b - 1e-12, "{a} < {b}");
        }
        assert!(after.get(3, 3).unwrap() > before.get(3, 3).unwrap());
    }

    #[test]
    fn test_shape_mismatch_and_no_sources() {
        let cost = Raster::filled(4, 4, 1.0);
        assert!(matches!(
            cost_distance(&mask(3, 4, &[(0, 0)]), &cost, 1.0),
            Err(Error::SizeMismatch { .. })
        ));
        assert!(matches!(
            cost_distance(&mask(4, 4, &[]), &cost, 1.0),
            Err(Error::NoSourceCells)
        ));
    }
}
