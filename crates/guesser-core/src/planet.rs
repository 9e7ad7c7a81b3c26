//! Planetary body profiles and the registry that maps planet identifiers to
//! them. Profiles are immutable once built and shared by reference.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuesserError, Result};

// ── Body ──────────────────────────────────────────────────────────────────────

/// Celestial bodies with a global map and a nomenclature catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Mars,
    Moon,
    Venus,
    Mercury,
}

impl Body {
    pub const ALL: [Body; 4] = [Body::Mars, Body::Moon, Body::Venus, Body::Mercury];

    /// Lowercase identifier used in configuration and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Body::Mars => "mars",
            Body::Moon => "moon",
            Body::Venus => "venus",
            Body::Mercury => "mercury",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Body {
    type Err = GuesserError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        Body::ALL
            .into_iter()
            .find(|b| b.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| GuesserError::UnknownPlanet(s.to_string()))
    }
}

// ── Longitude convention ──────────────────────────────────────────────────────

/// Longitude range used by a map. Also fixes the longitude at the map's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LonConvention {
    /// 0..360, east-positive. Left edge at 0°.
    East360,
    /// -180..180. Left edge at -180°.
    Signed180,
}

impl LonConvention {
    /// Longitude at pixel column 0.
    pub fn left_edge(self) -> f64 {
        match self {
            LonConvention::East360 => 0.0,
            LonConvention::Signed180 => -180.0,
        }
    }

    /// Inclusive longitude range accepted by the projector.
    pub fn range(self) -> (f64, f64) {
        match self {
            LonConvention::East360 => (0.0, 360.0),
            LonConvention::Signed180 => (-180.0, 180.0),
        }
    }

    pub fn contains(self, lon: f64) -> bool {
        let (lo, hi) = self.range();
        lon >= lo && lon <= hi
    }

    /// Wrap any finite longitude into this convention's half-open range.
    /// Returns `None` for NaN or infinite input.
    pub fn normalize(self, lon: f64) -> Option<f64> {
        if !lon.is_finite() {
            return None;
        }
        let edge = self.left_edge();
        Some((lon - edge).rem_euclid(360.0) + edge)
    }
}

// ── PlanetProfile ─────────────────────────────────────────────────────────────

/// Geometry and data files for one body's global equirectangular map.
/// The body is treated as a sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetProfile {
    pub body: Body,
    pub display_name: String,
    /// Map image width in pixels.
    pub map_width: u32,
    /// Map image height in pixels.
    pub map_height: u32,
    pub lon_convention: LonConvention,
    pub radius_km: f64,
    /// Global map image file name, relative to the data directory.
    pub map_image: String,
    /// Nomenclature KMZ file name, relative to the data directory.
    pub nomenclature_file: String,
}

impl PlanetProfile {
    /// Built-in profile for a body: 1024×512 maps, 0..360 east longitudes.
    pub fn builtin(body: Body) -> Self {
        let (display_name, radius_km, map_image, nomenclature_file) = match body {
            Body::Mars => (
                "Mars",
                3390.0,
                "mars_viking_clrmosaic_global_1024.jpg",
                "MARS_nomenclature_center_pts.kmz",
            ),
            Body::Moon => (
                "Moon",
                1737.0,
                "moon_lro_clrshade_global_1024.jpg",
                "MOON_nomenclature_center_pts.kmz",
            ),
            Body::Venus => (
                "Venus",
                6052.0,
                "venus_magellan_global_1024.jpg",
                "VENUS_nomenclature_center_pts.kmz",
            ),
            Body::Mercury => (
                "Mercury",
                2440.0,
                "mercury_messenger_global_1024.jpg",
                "MERCURY_nomenclature_center_pts.kmz",
            ),
        };
        Self {
            body,
            display_name: display_name.to_string(),
            map_width: 1024,
            map_height: 512,
            lon_convention: LonConvention::East360,
            radius_km,
            map_image: map_image.to_string(),
            nomenclature_file: nomenclature_file.to_string(),
        }
    }

    /// Same profile with different map pixel dimensions, e.g. once the real
    /// image has been opened and its size is known.
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Ground distance covered by one pixel along the equator, in km.
    pub fn km_per_pixel(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius_km / self.map_width as f64
    }

    fn validate(&self) -> Result<()> {
        if self.map_width == 0 || self.map_height == 0 {
            return Err(GuesserError::Config(format!(
                "{}: map dimensions must be non-zero, got {}x{}",
                self.body, self.map_width, self.map_height
            )));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(GuesserError::Config(format!(
                "{}: radius_km must be positive, got {}",
                self.body, self.radius_km
            )));
        }
        Ok(())
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Mapping from body to profile, supplied by configuration.
#[derive(Debug, Clone)]
pub struct PlanetRegistry {
    profiles: HashMap<Body, PlanetProfile>,
}

impl PlanetRegistry {
    /// Registry holding the built-in profile of every body.
    pub fn builtin() -> Self {
        let profiles = Body::ALL
            .into_iter()
            .map(|b| (b, PlanetProfile::builtin(b)))
            .collect();
        Self { profiles }
    }

    /// Built-in registry with the profiles listed in a JSON array replacing
    /// the built-in entry for their body.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overrides: Vec<PlanetProfile> = serde_json::from_str(json)
            .map_err(|e| GuesserError::Config(format!("invalid planet profiles: {e}")))?;
        let mut registry = Self::builtin();
        for profile in overrides {
            registry.insert(profile)?;
        }
        Ok(registry)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GuesserError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn insert(&mut self, profile: PlanetProfile) -> Result<()> {
        profile.validate()?;
        self.profiles.insert(profile.body, profile);
        Ok(())
    }

    /// Look up a profile by identifier (`"mars"`, `"moon"`, `"venus"`, `"mercury"`).
    pub fn get(&self, id: &str) -> Result<&PlanetProfile> {
        let body: Body = id.parse()?;
        self.profile(body)
    }

    pub fn profile(&self, body: Body) -> Result<&PlanetProfile> {
        self.profiles
            .get(&body)
            .ok_or_else(|| GuesserError::UnknownPlanet(body.to_string()))
    }
}

impl Default for PlanetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
