//! Great-circle distance between coordinates.
//!
//! Every distance the engine needs goes through [`distance`]. Nothing else in
//! the crate does trigonometry.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius (IUGG), in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

lazy_static! {
    static ref COORDINATE_RE: Regex =
        Regex::new(r"^\s*\(?\s*([-+]?\d+(?:\.\d+)?)\s*,\s*([-+]?\d+(?:\.\d+)?)\s*\)?\s*$")
            .expect("Invalid coordinate regex");
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("Could not parse coordinate from '{0}'")]
    Unparsable(String),
}

/// A latitude/longitude pair in decimal degrees.
///
/// Absence of a location is always `Option<Coordinate>::None`, never `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate, rejecting anything outside the valid ranges.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coord = Self::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }

    /// Latitude in [-90, 90], longitude in [-180, 180], both finite.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), GeoError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Parse `"lat,lon"`, optionally wrapped in parentheses.
    pub fn parse(text: &str) -> Result<Self, GeoError> {
        let caps = COORDINATE_RE
            .captures(text)
            .ok_or_else(|| GeoError::Unparsable(text.to_string()))?;

        let latitude: f64 = caps[1]
            .parse()
            .map_err(|_| GeoError::Unparsable(text.to_string()))?;
        let longitude: f64 = caps[2]
            .parse()
            .map_err(|_| GeoError::Unparsable(text.to_string()))?;

        Self::checked(latitude, longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Haversine distance in kilometers.
///
/// Symmetric, never negative, and exactly zero for identical inputs.
/// Fails if either coordinate is out of range.
pub fn distance(a: Coordinate, b: Coordinate) -> Result<f64, GeoError> {
    a.validate()?;
    b.validate()?;

    if a == b {
        return Ok(0.0);
    }

    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let half_dlat = (lat2 - lat1).abs() / 2.0;
    let half_dlon = (b.longitude - a.longitude).abs().to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let central_angle = 2.0 * h.sqrt().min(1.0).asin();

    Ok((EARTH_RADIUS_KM * central_angle).max(0.0))
}
