//! Cell adjacency on the analysis grid

/// 8-connected neighborhood of a cell
pub mod d8 {
    /// Offsets `(row, col)` of the eight neighbors, clockwise from NW
    pub const OFFSETS: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
        (1, 0),
        (1, -1),
        (0, -1),
    ];

    /// Step lengths in cell units for each entry of [`OFFSETS`]
    pub const DISTANCES: [f64; 8] = [
        std::f64::consts::SQRT_2,
        1.0,
        std::f64::consts::SQRT_2,
        1.0,
        std::f64::consts::SQRT_2,
        1.0,
        std::f64::consts::SQRT_2,
        1.0,
    ];

    /// Neighbor of `(row, col)` at offset index `dir`, if it lies inside `rows x cols`
    #[inline]
    pub fn neighbor(row: usize, col: usize, dir: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let (dr, dc) = OFFSETS[dir];
        let nr = row.checked_add_signed(dr)?;
        let nc = col.checked_add_signed(dc)?;
        (nr < rows && nc < cols).then_some((nr, nc))
    }
}
