//! Analysis grid derived from a bounding region

use serde::{Deserialize, Serialize};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};

/// Axis-aligned bounding rectangle in CRS units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Finite with strictly positive extent on both axes
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }
}

/// Raster geometry shared by every layer of one analysis run.
///
/// Built once from the region's bounding box and a resolution in meters:
/// `width = ceil(dx / resolution)`, `height = ceil(dy / resolution)`, and the
/// transform stretches that many cells exactly over the box, so a cell can be
/// marginally smaller than `resolution` when the extent is not a multiple of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    resolution: f64,
    transform: GeoTransform,
    crs: CRS,
    bounds: Bounds,
}

impl Grid {
    /// Build the grid covering `bounds` at `resolution` meters per cell
    pub fn from_bounds(bounds: Bounds, resolution: f64, crs: CRS) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(Error::invalid_parameter(
                "resolution",
                resolution,
                "must be a positive number of meters",
            ));
        }
        if !bounds.is_valid() {
            return Err(Error::InvalidBounds {
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
            });
        }

        let width = (bounds.width() / resolution).ceil() as usize;
        let height = (bounds.height() / resolution).ceil() as usize;
        let transform = GeoTransform::from_bounds(
            bounds.min_x,
            bounds.min_y,
            bounds.max_x,
            bounds.max_y,
            width,
            height,
        );

        Ok(Self {
            width,
            height,
            resolution,
            transform,
            crs,
            bounds,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Nominal resolution in meters per cell
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &CRS {
        &self.crs
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World coordinates of the center of cell (row, col)
    pub fn pixel_to_world(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// WGS84 `(longitude, latitude)` of a world coordinate, if the CRS supports it
    pub fn to_geographic(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.crs.to_geographic(x, y)
    }

    /// A zero-filled raster on this grid
    pub fn raster<T: RasterElement>(&self) -> Raster<T> {
        self.filled(T::zero())
    }

    /// A raster on this grid with every cell set to `value`
    pub fn filled<T: RasterElement>(&self, value: T) -> Raster<T> {
        let mut raster = Raster::filled(self.height, self.width, value);
        raster.set_transform(self.transform);
        raster.set_crs(Some(self.crs.clone()));
        raster
    }

    /// Fail with [`Error::SizeMismatch`] unless `raster` has this grid's shape
    pub fn check_shape<T: RasterElement>(&self, raster: &Raster<T>) -> Result<()> {
        let (ar, ac) = raster.shape();
        if (ar, ac) != self.shape() {
            return Err(Error::SizeMismatch {
                er: self.height,
                ec: self.width,
                ar,
                ac,
            });
        }
        Ok(())
    }

    /// Whether `raster` shares this grid's shape and pixel lattice
    pub fn is_aligned<T: RasterElement>(&self, raster: &Raster<T>) -> bool {
        raster.shape() == self.shape() && raster.transform().approx_eq(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dimensions_round_up() {
        let grid = Grid::from_bounds(Bounds::new(0.0, 0.0, 1050.0, 400.0), 100.0, CRS::default()).unwrap();
        assert_eq!(grid.width(), 11);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.shape(), (4, 11));
        assert_eq!(grid.len(), 44);
    }

    #[test]
    fn test_pixel_to_world_is_cell_center() {
        let grid = Grid::from_bounds(Bounds::new(500.0, 1000.0, 900.0, 1400.0), 100.0, CRS::default()).unwrap();

        let (x, y) = grid.pixel_to_world(0, 0);
        assert_relative_eq!(x, 550.0, epsilon = 1e-9);
        assert_relative_eq!(y, 1350.0, epsilon = 1e-9);

        let (x, y) = grid.pixel_to_world(3, 2);
        assert_relative_eq!(x, 750.0, epsilon = 1e-9);
        assert_relative_eq!(y, 1050.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            Grid::from_bounds(b, 0.0, CRS::default()),
            Err(Error::InvalidParameter { name: "resolution", .. })
        ));
        assert!(Grid::from_bounds(b, f64::NAN, CRS::default()).is_err());
        assert!(matches!(
            Grid::from_bounds(Bounds::new(0.0, 0.0, 0.0, 10.0), 1.0, CRS::default()),
            Err(Error::InvalidBounds { .. })
        ));
        assert!(Grid::from_bounds(Bounds::new(0.0, f64::INFINITY, 1.0, 10.0), 1.0, CRS::default()).is_err());
    }

    #[test]
    fn test_rasters_carry_grid_metadata() {
        let grid = Grid::from_bounds(Bounds::new(0.0, 0.0, 300.0, 200.0), 100.0, CRS::from_epsg(32612)).unwrap();
        let r: Raster<u8> = grid.raster();
        assert_eq!(r.shape(), (2, 3));
        assert!(grid.is_aligned(&r));
        assert!(grid.check_shape(&r).is_ok());
        assert!(grid.check_shape(&Raster::<u8>::new(3, 2)).is_err());
        assert_eq!(r.crs().and_then(|c| c.epsg()), Some(32612));
    }
}
