use thiserror::Error;

/// Errors surfaced by the feature locator.
///
/// Malformed individual placemarks never show up here: the loader skips and
/// counts them. Every other failure propagates to the caller unchanged.
#[derive(Debug, Error)]
pub enum GuesserError {
    /// Latitude or longitude outside the range accepted by the planet's map.
    #[error("invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The feature data source could not be read at all, or held no usable record.
    #[error("catalog unreadable: {0}")]
    CatalogUnreadable(String),

    /// The selection filter excluded every feature in the catalog.
    #[error("no feature matches the selection filter")]
    NoMatchingFeature,

    /// Patch size exceeds the map dimensions.
    #[error("patch {patch_width}x{patch_height} does not fit a {map_width}x{map_height} map")]
    PatchTooLarge {
        patch_width: u32,
        patch_height: u32,
        map_width: u32,
        map_height: u32,
    },

    #[error("patch size must be non-zero, got {width}x{height}")]
    EmptyPatch { width: u32, height: u32 },

    #[error("unknown planet '{0}' (expected mars, moon, venus or mercury)")]
    UnknownPlanet(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GuesserError>;
