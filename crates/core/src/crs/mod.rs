//! Coordinate Reference System handling

mod projection;

pub use projection::Projection;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate Reference System of an analysis grid.
///
/// Serialized as its identifier string (`"EPSG:5070"`), which is also what
/// configuration files carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CRS {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation for CRSs without an EPSG code
    wkt: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// NAD83 / Conus Albers (EPSG:5070), the default analysis projection
    pub fn conus_albers() -> Self {
        Self::from_epsg(5070)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", wkt);
        }
        "Unknown".to_string()
    }

    /// Projection used to recover geographic coordinates, if supported
    pub fn projection(&self) -> Option<Projection> {
        self.epsg.and_then(Projection::from_epsg)
    }

    /// Convert projected `(x, y)` to WGS84 `(longitude, latitude)` in degrees.
    ///
    /// `None` when the CRS has no supported inverse projection.
    pub fn to_geographic(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.projection().map(|p| p.inverse(x, y))
    }
}

impl FromStr for CRS {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(wkt) = trimmed.strip_prefix("WKT:") {
            return Ok(Self::from_wkt(wkt));
        }

        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("EPSG") => code,
            Some(_) => return Err(Error::UnknownCrs(s.to_string())),
            None => trimmed,
        };

        code.trim()
            .parse::<u32>()
            .map(Self::from_epsg)
            .map_err(|_| Error::UnknownCrs(s.to_string()))
    }
}

impl TryFrom<String> for CRS {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CRS> for String {
    fn from(crs: CRS) -> Self {
        crs.identifier()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::conus_albers()
    }
}
