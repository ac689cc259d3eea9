//! Nearest-neighbor resampling onto another pixel lattice
//!
//! Categorical rasters (land-cover class codes) must never be interpolated,
//! so this is the only resampling Unreach performs. Reprojection is not
//! supported: source and target must share a CRS.

use crate::maybe_rayon::*;
use unreach_core::raster::{GeoTransform, Raster, RasterElement};
use unreach_core::{Error, Grid, Result, CRS};

/// Resample `src` onto a `rows x cols` lattice described by `transform`.
///
/// Each target cell takes the value of the source cell containing its center.
/// Target cells whose center falls outside the source get `fill`. If both
/// rasters declare a CRS they must be equivalent.
pub fn resample_nearest<T: RasterElement>(
    src: &Raster<T>,
    transform: &GeoTransform,
    rows: usize,
    cols: usize,
    crs: Option<&CRS>,
    fill: T,
) -> Result<Raster<T>> {
    if let (Some(a), Some(b)) = (src.crs(), crs) {
        if !a.is_equivalent(b) {
            return Err(Error::CrsMismatch(a.identifier(), b.identifier()));
        }
    }

    let mut output = if src.shape() == (rows, cols) && src.transform().approx_eq(transform) {
        src.clone()
    } else {
        let (src_rows, src_cols) = src.shape();
        let src_transform = src.transform();

        let data: Vec<T> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                (0..cols)
                    .map(|col| {
                        let (x, y) = transform.pixel_to_geo(col, row);
                        let (fc, fr) = src_transform.geo_to_pixel(x, y);
                        if !(fc >= 0.0 && fr >= 0.0) {
                            return fill;
                        }
                        let (sc, sr) = (fc.floor() as usize, fr.floor() as usize);
                        if sr < src_rows && sc < src_cols {
                            unsafe { src.get_unchecked(sr, sc) }
                        } else {
                            fill
                        }
                    })
                    .collect::<Vec<T>>()
            })
            .collect();

        let mut out = Raster::from_vec(data, rows, cols)?;
        out.set_transform(*transform);
        out.set_nodata(src.nodata());
        out
    };

    if let Some(crs) = crs.or(src.crs()) {
        output.set_crs(Some(crs.clone()));
    }
    Ok(output)
}

/// Resample `src` onto the lattice of `like`
pub fn resample_like<T: RasterElement, U: RasterElement>(
    src: &Raster<T>,
    like: &Raster<U>,
    fill: T,
) -> Result<Raster<T>> {
    let (rows, cols) = like.shape();
    resample_nearest(src, like.transform(), rows, cols, like.crs(), fill)
}

/// Resample `src` onto an analysis grid
pub fn resample_to_grid<T: RasterElement>(src: &Raster<T>, grid: &Grid, fill: T) -> Result<Raster<T>> {
    let (rows, cols) = grid.shape();
    resample_nearest(src, grid.transform(), rows, cols, Some(grid.crs()), fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Raster<i32> {
        // 2x2 coarse classes on 20 m cells
        let mut r = Raster::from_vec(vec![11, 41, 81, 95], 2, 2).unwrap();
        r.set_transform(GeoTransform::new(0.0, 40.0, 20.0, -20.0));
        r
    }

    #[test]
    fn test_upsample_copies_codes() {
        let src = classes();
        let target = GeoTransform::new(0.0, 40.0, 10.0, -10.0);
        let out = resample_nearest(&src, &target, 4, 4, None, 0).unwrap();

        assert_eq!(out.get(0, 0).unwrap(), 11);
        assert_eq!(out.get(1, 1).unwrap(), 11);
        assert_eq!(out.get(0, 3).unwrap(), 41);
        assert_eq!(out.get(3, 0).unwrap(), 81);
        assert_eq!(out.get(2, 2).unwrap(), 95);
        // Only codes present in the source ever appear
        assert!(out.data().iter().all(|c| [11, 41, 81, 95].contains(c)));
    }

    #[test]
    fn test_outside_source_gets_fill() {
        let src = classes();
        let target = GeoTransform::new(20.0, 40.0, 20.0, -20.0);
        let out = resample_nearest(&src, &target, 2, 2, None, -1).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 41);
        assert_eq!(out.get(0, 1).unwrap(), -1);
        assert_eq!(out.get(1, 1).unwrap(), -1);
    }

    #[test]
    fn test_aligned_is_identity() {
        let src = classes();
        let out = resample_like(&src, &src, 0).unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn test_crs_mismatch_is_rejected() {
        let mut src = classes();
        src.set_crs(Some(CRS::from_epsg(32612)));
        let target = GeoTransform::new(0.0, 40.0, 10.0, -10.0);
        let result = resample_nearest(&src, &target, 4, 4, Some(&CRS::from_epsg(5070)), 0);
        assert!(matches!(result, Err(Error::CrsMismatch(_, _))));
    }
}
