//! Boundary and eligibility masks
//!
//! Masks are `Raster<u8>` where nonzero means "inside" / "eligible". Masking
//! writes NaN, the invalid-cell sentinel, and always returns a new raster.

use tracing::debug;
use unreach_core::raster::Raster;
use unreach_core::Result;

/// NaN every cell of `field` where `mask` is zero
fn mask_out(field: &Raster<f64>, mask: &Raster<u8>) -> Result<Raster<f64>> {
    field.ensure_same_shape(mask)?;
    let mut out = field.clone();
    ndarray::Zip::from(out.data_mut())
        .and(mask.data())
        .for_each(|v, &m| {
            if m == 0 {
                *v = f64::NAN;
            }
        });
    out.set_nodata(Some(f64::NAN));
    Ok(out)
}

/// Restrict a field to the region of interest. Cells outside become NaN;
/// cells inside are untouched.
pub fn apply_boundary(field: &Raster<f64>, boundary: &Raster<u8>) -> Result<Raster<f64>> {
    let out = mask_out(field, boundary)?;
    debug!(inside = mask_coverage(boundary), total = boundary.len(), "boundary applied");
    Ok(out)
}

/// Mask of cells whose land-cover class is not in `excluded`
pub fn eligibility_mask(landcover: &Raster<i32>, excluded: &[i32]) -> Raster<u8> {
    let mask = landcover.map(|code| u8::from(!excluded.contains(&code)));
    let eligible = mask_coverage(&mask);
    let total = mask.len().max(1);
    debug!(
        eligible,
        excluded_pct = format_args!("{:.1}", 100.0 * (total - eligible) as f64 / total as f64),
        "eligibility mask built"
    );
    mask
}

/// Working copy of `field` with ineligible cells set to NaN.
///
/// Used only for searching destinations; the stored distance field keeps
/// true distances through ineligible terrain.
pub fn apply_eligibility(field: &Raster<f64>, eligibility: &Raster<u8>) -> Result<Raster<f64>> {
    mask_out(field, eligibility)
}

/// Number of nonzero cells in a mask
pub fn mask_coverage(mask: &Raster<u8>) -> usize {
    mask.count_where(|v| v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unreach_core::Error;

    #[test]
    fn test_boundary_masks_outside_only() {
        let field = Raster::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let boundary = Raster::from_vec(vec![1u8, 0, 1, 1], 2, 2).unwrap();
        let out = apply_boundary(&field, &boundary).unwrap();

        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert!(out.get(0, 1).unwrap().is_nan());
        assert_eq!(out.get(1, 1).unwrap(), 4.0);
        // Input untouched
        assert_eq!(field.get(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_boundary_shape_mismatch() {
        let field = Raster::filled(2, 2, 1.0);
        let boundary: Raster<u8> = Raster::filled(2, 3, 1);
        assert!(matches!(
            apply_boundary(&field, &boundary),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_eligibility_mask_excludes_codes() {
        let lc = Raster::from_vec(vec![11, 41, 12, 81, 0, 95], 2, 3).unwrap();
        let mask = eligibility_mask(&lc, &[11, 12]);
        assert_eq!(mask.data().iter().copied().collect::<Vec<_>>(), vec![0, 1, 0, 1, 1, 1]);
        assert_eq!(mask_coverage(&mask), 4);

        let all = eligibility_mask(&lc, &[]);
        assert_eq!(mask_coverage(&all), 6);
    }

    #[test]
    fn test_eligibility_is_a_copy() {
        let field = Raster::filled(2, 2, 5.0);
        let mask = Raster::from_vec(vec![0u8, 1, 1, 1], 2, 2).unwrap();
        let working = apply_eligibility(&field, &mask).unwrap();
        assert!(working.get(0, 0).unwrap().is_nan());
        assert_eq!(field.get(0, 0).unwrap(), 5.0);
    }
}
