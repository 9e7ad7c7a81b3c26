//! Feature catalog: parses a planet's nomenclature placemarks into validated,
//! deduplicated feature records.
//!
//! A `Catalog` is built once per planet and shared read-only by the selector
//! and the round state machine. Malformed placemarks are skipped and counted;
//! the load fails only when the source cannot be read or yields nothing usable.

pub mod kml;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::coords::{project, PixelCoord};
use crate::error::{GuesserError, Result};
use crate::planet::{Body, PlanetProfile};

pub use kml::{open_catalog, parse_placemarks, KmlDocument, KmzArchive};

/// Two same-named placemarks closer than this (degrees, per axis) are duplicates.
pub const DEDUP_EPSILON_DEG: f64 = 1e-3;

// ── Raw input ─────────────────────────────────────────────────────────────────

/// One raw named point from a data source, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark {
    pub name: Option<String>,
    /// KML coordinate text: `lon,lat[,alt]`, possibly several tuples.
    pub coordinates: Option<String>,
    /// Extended data key/value pairs, in document order.
    pub properties: Vec<(String, String)>,
}

impl Placemark {
    /// A well-formed point placemark.
    pub fn point(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            coordinates: Some(format!("{lon},{lat}")),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    fn property(&self, keys: &[&str]) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| keys.iter().any(|want| k.eq_ignore_ascii_case(want)))
            .map(|(_, v)| v.as_str())
    }
}

/// Anything that can enumerate named point placemarks.
pub trait FeatureDataSource {
    fn placemarks(&self) -> Result<Vec<Placemark>>;
}

impl FeatureDataSource for [Placemark] {
    fn placemarks(&self) -> Result<Vec<Placemark>> {
        Ok(self.to_vec())
    }
}

impl FeatureDataSource for Vec<Placemark> {
    fn placemarks(&self) -> Result<Vec<Placemark>> {
        Ok(self.clone())
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// A validated named surface feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub name: String,
    /// Degrees, -90 to +90.
    pub lat: f64,
    /// Degrees, in the planet's longitude convention.
    pub lon: f64,
    pub diameter_km: Option<f64>,
    pub feature_type: Option<String>,
    /// Map pixel of the feature centre, computed at load time.
    pub pixel: PixelCoord,
}

#[derive(Debug, Error)]
enum RecordDefect {
    #[error("missing name")]
    MissingName,
    #[error("missing coordinates")]
    MissingCoordinates,
    #[error("unparseable coordinates '{0}'")]
    BadCoordinates(String),
    #[error(transparent)]
    OffMap(GuesserError),
}

/// Parse the first `lon,lat[,alt]` tuple of a KML coordinate string.
fn parse_lon_lat(text: &str) -> Option<(f64, f64)> {
    let tuple = text.split_whitespace().next()?;
    let mut parts = tuple.split(',');
    let lon: f64 = parts.next()?.trim().parse().ok()?;
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    Some((lon, lat))
}

fn parse_record(planet: &PlanetProfile, pm: &Placemark) -> std::result::Result<FeatureRecord, RecordDefect> {
    let name = pm
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(RecordDefect::MissingName)?;

    let coords = pm.coordinates.as_deref().ok_or(RecordDefect::MissingCoordinates)?;
    let (raw_lon, lat) =
        parse_lon_lat(coords).ok_or_else(|| RecordDefect::BadCoordinates(coords.to_string()))?;

    // KML longitudes are -180..180; bring them into the map's convention.
    let lon = planet
        .lon_convention
        .normalize(raw_lon)
        .ok_or_else(|| RecordDefect::BadCoordinates(coords.to_string()))?;
    let pixel = project(planet, lat, lon).map_err(RecordDefect::OffMap)?;

    let diameter_km = pm
        .property(&["diameter", "diameter_km"])
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);
    let feature_type = pm
        .property(&["type", "feature_type", "featuretype"])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(FeatureRecord {
        name: name.to_string(),
        lat,
        lon,
        diameter_km,
        feature_type,
        pixel,
    })
}

fn lon_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

fn is_duplicate(a: &FeatureRecord, b: &FeatureRecord) -> bool {
    (a.lat - b.lat).abs() <= DEDUP_EPSILON_DEG && lon_delta(a.lon, b.lon) <= DEDUP_EPSILON_DEG
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// The loaded, read-only feature list of one planet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub body: Body,
    /// Valid features in source order.
    pub features: Vec<FeatureRecord>,
    /// Placemarks dropped because they were malformed or off the map.
    pub skipped: usize,
    /// Placemarks dropped as duplicates of an earlier feature.
    pub duplicates: usize,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[FeatureRecord] {
        &self.features
    }

    /// First feature with this name, ignoring case (Unicode-aware).
    pub fn find(&self, name: &str) -> Option<&FeatureRecord> {
        let name = name.trim().to_lowercase();
        self.features.iter().find(|f| f.name.to_lowercase() == name)
    }

    /// Count of features per type tag; untagged features are counted under `"untyped"`.
    pub fn type_histogram(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for f in &self.features {
            let key = f.feature_type.clone().unwrap_or_else(|| "untyped".to_string());
            *counts.entry(key).or_default() += 1;
        }
        let mut out: Vec<_> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

/// Load and validate a planet's feature catalog.
pub fn load<S>(planet: &PlanetProfile, source: &S) -> Result<Catalog>
where
    S: FeatureDataSource + ?Sized,
{
    let placemarks = source.placemarks()?;
    let total = placemarks.len();

    let mut features: Vec<FeatureRecord> = Vec::with_capacity(total);
    let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
    let mut skipped = 0usize;
    let mut duplicates = 0usize;

    for (i, pm) in placemarks.iter().enumerate() {
        let record = match parse_record(planet, pm) {
            Ok(r) => r,
            Err(defect) => {
                debug!(index = i, name = ?pm.name, %defect, "skipping placemark");
                skipped += 1;
                continue;
            }
        };

        let same_name = by_name.entry(record.name.to_lowercase()).or_default();
        if same_name.iter().any(|&j| is_duplicate(&features[j], &record)) {
            debug!(index = i, name = %record.name, "dropping duplicate placemark");
            duplicates += 1;
            continue;
        }
        same_name.push(features.len());
        features.push(record);
    }

    if features.is_empty() {
        return Err(GuesserError::CatalogUnreadable(format!(
            "no valid features for {} ({total} placemarks, {skipped} malformed)",
            planet.body
        )));
    }

    info!(
        body = %planet.body,
        features = features.len(),
        skipped,
        duplicates,
        "catalog loaded"
    );

    Ok(Catalog {
        body: planet.body,
        features,
        skipped,
        duplicates,
    })
}

/// Small hand-picked feature set per body, used when no nomenclature file is
/// available. Longitudes are 0..360 east.
pub fn builtin_features(body: Body) -> Vec<Placemark> {
    let entries: &[(&str, f64, f64)] = match body {
        Body::Mars => &[
            ("Olympus Mons", 18.65, 226.2),
            ("Valles Marineris", -13.9, 301.3),
            ("Gale Crater", -5.4, 137.8),
            ("Viking 1 Landing Site", 25.0, 315.0),
        ],
        Body::Moon => &[
            ("Mare Tranquillitatis", 0.67, 23.47),
            ("Mare Nectaris", -8.5, 15.5),
            ("Mare Imbrium", 26.1, 3.2),
            ("Luna Center", 0.0, 0.0),
        ],
        Body::Venus => &[
            ("Venus Center", 0.0, 0.0),
            ("North Region", 65.0, 0.0),
            ("South Region", -65.0, 180.0),
            ("East Region", 30.0, 90.0),
        ],
        Body::Mercury => &[
            ("Mercury Center", 0.0, 0.0),
            ("Caloris Basin", 30.0, 30.0),
            ("South Pole Region", -30.0, 180.0),
            ("West Region", 45.0, 270.0),
        ],
    };
    entries
        .iter()
        .map(|&(name, lat, lon)| Placemark::point(name, lat, lon))
        .collect()
}
