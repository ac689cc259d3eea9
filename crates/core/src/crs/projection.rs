//! Pure-Rust inverse projections to WGS84 (Snyder 1987, USGS Prof. Paper 1395).
//!
//! Covers the projected CRSs remoteness grids are usually built in:
//! EPSG:5070 (NAD83 / Conus Albers), EPSG:326xx / 327xx (UTM) and EPSG:3857.
//! NAD83 and WGS84 are treated as the same datum (sub-meter difference).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// ── Ellipsoids ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ellipsoid {
    /// Semi-major axis (m)
    a: f64,
    /// Eccentricity squared
    e2: f64,
}

impl Ellipsoid {
    fn e(&self) -> f64 {
        self.e2.sqrt()
    }
}

const WGS84_F: f64 = 1.0 / 298.257_223_563;
const GRS80_F: f64 = 1.0 / 298.257_222_101;

const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    e2: WGS84_F * (2.0 - WGS84_F),
};
const GRS80: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    e2: GRS80_F * (2.0 - GRS80_F),
};

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Albers equal-area conic parameters (all angles in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersParams {
    pub lat0: f64,
    pub lon0: f64,
    pub lat1: f64,
    pub lat2: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl AlbersParams {
    /// EPSG:5070 NAD83 / Conus Albers
    pub const CONUS: AlbersParams = AlbersParams {
        lat0: 23.0,
        lon0: -96.0,
        lat1: 29.5,
        lat2: 45.5,
        false_easting: 0.0,
        false_northing: 0.0,
    };
}

/// Supported map projections
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Longitude/latitude in degrees (EPSG:4326)
    Geographic,
    /// Spherical Web Mercator (EPSG:3857)
    WebMercator,
    /// Universal Transverse Mercator on WGS84
    Utm { zone: u32, north: bool },
    /// Albers equal-area conic on GRS80
    Albers(AlbersParams),
}

impl Projection {
    /// Map an EPSG code to a supported projection
    pub fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4326 | 4269 => Some(Projection::Geographic),
            3857 => Some(Projection::WebMercator),
            5070 => Some(Projection::Albers(AlbersParams::CONUS)),
            32601..=32660 => Some(Projection::Utm {
                zone: epsg - 32600,
                north: true,
            }),
            32701..=32760 => Some(Projection::Utm {
                zone: epsg - 32700,
                north: false,
            }),
            _ => None,
        }
    }

    /// Projected `(x, y)` to geographic `(lon, lat)` in degrees
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => web_mercator_inverse(x, y),
            Projection::Utm { zone, north } => utm_inverse(x, y, zone, north),
            Projection::Albers(p) => albers_inverse(x, y, &p),
        }
    }

    /// Geographic `(lon, lat)` in degrees to projected `(x, y)`
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        match *self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator => web_mercator_forward(lon, lat),
            Projection::Utm { zone, north } => utm_forward(lon, lat, zone, north),
            Projection::Albers(p) => albers_forward(lon, lat, &p),
        }
    }
}

// ── Web Mercator ─────────────────────────────────────────────────────────

fn web_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let r = WGS84.a;
    let lon = (x / r).to_degrees();
    let lat = (2.0 * (y / r).exp().atan() - FRAC_PI_2).to_degrees();
    (lon, lat)
}

fn web_mercator_forward(lon: f64, lat: f64) -> (f64, f64) {
    let r = WGS84.a;
    let x = r * lon.to_radians();
    let y = r * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

// ── UTM (Snyder pp. 61-64) ───────────────────────────────────────────────

fn utm_central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

/// Meridional arc from equator to latitude `lat` (radians). Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e2 = WGS84.e2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    WGS84.a
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

fn utm_forward(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let e2 = WGS84.e2;
    let ep2 = e2 / (1.0 - e2);
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let tan_lat = lat.tan();

    let n = WGS84.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * (lon - utm_central_meridian(zone));
    let a2 = a * a;
    let a4 = a2 * a2;

    let easting = UTM_K0
        * n
        * (a + (1.0 - t + c) * a2 * a / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a4 * a / 120.0)
        + UTM_FALSE_EASTING;

    let northing = UTM_K0
        * (meridional_arc(lat)
            + n * tan_lat
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a4 * a2 / 720.0));

    if north {
        (easting, northing)
    } else {
        (easting, northing + UTM_FALSE_NORTHING_SOUTH)
    }
}

fn utm_inverse(x: f64, y: f64, zone: u32, north: bool) -> (f64, f64) {
    let e2 = WGS84.e2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let x = x - UTM_FALSE_EASTING;
    let y = if north { y } else { y - UTM_FALSE_NORTHING_SOUTH };

    // Footpoint latitude (Snyder eqs. 8-18, 3-24, 7-19)
    let m = y / UTM_K0;
    let mu = m / (WGS84.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let sqrt_1me2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let w = 1.0 - e2 * sin_phi1 * sin_phi1;
    let n1 = WGS84.a / w.sqrt();
    let r1 = WGS84.a * (1.0 - e2) / w.powf(1.5);
    let d = x / (n1 * UTM_K0);
    let d2 = d * d;
    let d4 = d2 * d2;
    let d6 = d4 * d2;

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1) * d6
                    / 720.0);

    let lon = utm_central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d4 * d / 120.0)
            / cos_phi1;

    (lon.to_degrees(), lat.to_degrees())
}

// ── Albers equal-area conic (Snyder pp. 98-103) ─────────────────────────

/// Snyder eq. 14-15
fn albers_m(phi: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - GRS80.e2 * s * s).sqrt()
}

/// Snyder eq. 3-12
fn albers_q(phi: f64) -> f64 {
    let e = GRS80.e();
    let s = phi.sin();
    (1.0 - GRS80.e2) * (s / (1.0 - GRS80.e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
}

/// Cone constants `(n, C, rho0)`
fn albers_constants(p: &AlbersParams) -> (f64, f64, f64) {
    let phi1 = p.lat1.to_radians();
    let phi2 = p.lat2.to_radians();
    let m1 = albers_m(phi1);
    let m2 = albers_m(phi2);
    let q1 = albers_q(phi1);
    let q2 = albers_q(phi2);
    let q0 = albers_q(p.lat0.to_radians());

    let n = (m1 * m1 - m2 * m2) / (q2 - q1);
    let c = m1 * m1 + n * q1;
    let rho0 = GRS80.a * (c - n * q0).sqrt() / n;
    (n, c, rho0)
}

fn albers_forward(lon: f64, lat: f64, p: &AlbersParams) -> (f64, f64) {
    let (n, c, rho0) = albers_constants(p);
    let rho = GRS80.a * (c - n * albers_q(lat.to_radians())).sqrt() / n;
    let theta = n * (lon - p.lon0).to_radians();
    let x = rho * theta.sin() + p.false_easting;
    let y = rho0 - rho * theta.cos() + p.false_northing;
    (x, y)
}

fn albers_inverse(x: f64, y: f64, p: &AlbersParams) -> (f64, f64) {
    let (n, c, rho0) = albers_constants(p);
    let e = GRS80.e();
    let e2 = GRS80.e2;

    let x = x - p.false_easting;
    let dy = rho0 - (y - p.false_northing);
    let (rho, theta) = if n < 0.0 {
        (-(x * x + dy * dy).sqrt(), (-x).atan2(-dy))
    } else {
        ((x * x + dy * dy).sqrt(), x.atan2(dy))
    };
    let q = (c - rho * rho * n * n / (GRS80.a * GRS80.a)) / n;

    // Snyder eq. 3-16, iterated to convergence
    let mut phi = (q / 2.0).clamp(-1.0, 1.0).asin();
    for _ in 0..15 {
        let s = phi.sin();
        let one_minus = 1.0 - e2 * s * s;
        let delta = one_minus * one_minus / (2.0 * phi.cos())
            * (q / (1.0 - e2) - s / one_minus + (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln());
        phi += delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }

    let lon = p.lon0 + (theta / n).to_degrees();
    (lon, phi.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64, msg: &str) {
        let diff = (a - b).abs();
        assert!(diff < tol, "{msg}: expected {b}, got {a}, diff {diff} exceeds tolerance {tol}");
    }

    #[test]
    fn epsg_lookup() {
        assert_eq!(Projection::from_epsg(32612), Some(Projection::Utm { zone: 12, north: true }));
        assert_eq!(Projection::from_epsg(32721), Some(Projection::Utm { zone: 21, north: false }));
        assert_eq!(Projection::from_epsg(5070), Some(Projection::Albers(AlbersParams::CONUS)));
        assert_eq!(Projection::from_epsg(32600), None);
        assert_eq!(Projection::from_epsg(27700), None);
    }

    // Reference from PROJ: EPSG:4326 (-3.7037, 40.4168) -> EPSG:32630 (440298.94, 4474257.31)
    #[test]
    fn utm_inverse_madrid() {
        let (lon, lat) = utm_inverse(440_298.94, 4_474_257.31, 30, true);
        assert_close(lon, -3.7037, 1e-5, "lon");
        assert_close(lat, 40.4168, 1e-5, "lat");
    }

    // Reference from PROJ: (-58.3816, -34.6037) -> EPSG:32721 (373317.50, 6170036.17)
    #[test]
    fn utm_inverse_southern_hemisphere() {
        let (lon, lat) = utm_inverse(373_317.50, 6_170_036.17, 21, false);
        assert_close(lon, -58.3816, 1e-5, "lon");
        assert_close(lat, -34.6037, 1e-5, "lat");
    }

    #[test]
    fn utm_round_trip() {
        let p = Projection::Utm { zone: 12, north: true };
        let (x, y) = p.forward(-111.5, 39.2);
        let (lon, lat) = p.inverse(x, y);
        assert_close(lon, -111.5, 1e-6, "lon");
        assert_close(lat, 39.2, 1e-6, "lat");
    }

    #[test]
    fn albers_origin_maps_to_projection_center() {
        let (lon, lat) = albers_inverse(0.0, 0.0, &AlbersParams::CONUS);
        assert_close(lon, -96.0, 1e-9, "lon");
        assert_close(lat, 23.0, 1e-9, "lat");
    }

    #[test]
    fn albers_round_trip_over_utah() {
        let p = Projection::Albers(AlbersParams::CONUS);
        for &(lon, lat) in &[(-111.89, 40.76), (-109.05, 37.0), (-114.05, 42.0)] {
            let (x, y) = p.forward(lon, lat);
            // Utah lies well west of the central meridian
            assert!(x < -1_000_000.0, "x = {x}");
            let (lon2, lat2) = p.inverse(x, y);
            assert_close(lon2, lon, 1e-8, "lon");
            assert_close(lat2, lat, 1e-8, "lat");
        }
    }

    #[test]
    fn web_mercator_round_trip() {
        let p = Projection::WebMercator;
        let (x, y) = p.forward(-111.0, 40.0);
        let (lon, lat) = p.inverse(x, y);
        assert_close(lon, -111.0, 1e-9, "lon");
        assert_close(lat, 40.0, 1e-9, "lat");
        let (lon0, lat0) = p.inverse(0.0, 0.0);
        assert_close(lon0, 0.0, 1e-12, "lon at origin");
        assert_close(lat0, 0.0, 1e-12, "lat at origin");
    }
}
