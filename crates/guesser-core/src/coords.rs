//! Geographic coordinates and the equirectangular map projection.
//! All coordinate math uses f64 for precision.

use serde::{Deserialize, Serialize};

use crate::error::{GuesserError, Result};
use crate::planet::PlanetProfile;

/// A point on a planetary surface in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, in the owning map's convention.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A pixel on a global map image. Row 0 is the north pole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Project a geographic coordinate onto the planet's equirectangular map.
///
/// `lon` must already be in the planet's longitude convention; the projector
/// does not guess. Column `width` wraps to 0 so both sides of the seam land on
/// the same pixel. The row is clamped to the last image row at the south pole.
pub fn project(planet: &PlanetProfile, lat: f64, lon: f64) -> Result<PixelCoord> {
    let invalid = || GuesserError::InvalidCoordinate { lat, lon };

    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(invalid());
    }
    if !lon.is_finite() || !planet.lon_convention.contains(lon) {
        return Err(invalid());
    }

    let width = planet.map_width as f64;
    let height = planet.map_height as f64;
    let offset = lon - planet.lon_convention.left_edge();

    let x = ((offset / 360.0) * width).round().rem_euclid(width);
    let y = ((90.0 - lat) / 180.0 * height).round().clamp(0.0, height - 1.0);

    // Guard the last column against float error.
    let x = (x as u32).min(planet.map_width - 1);
    Ok(PixelCoord::new(x, y as u32))
}

/// Geographic coordinate of a pixel centre; the inverse of [`project`] up to
/// pixel quantisation.
pub fn unproject(planet: &PlanetProfile, pixel: PixelCoord) -> LatLon {
    let width = planet.map_width as f64;
    let height = planet.map_height as f64;
    let lon = (pixel.x as f64 + 0.5) / width * 360.0 + planet.lon_convention.left_edge();
    let lat = 90.0 - (pixel.y as f64 + 0.5) / height * 180.0;
    LatLon::new(lat, lon)
}
