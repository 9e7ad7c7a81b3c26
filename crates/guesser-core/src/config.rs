use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crop::PatchSize;
use crate::error::{GuesserError, Result};
use crate::game::NameMatcher;
use crate::planet::Body;
use crate::selector::FeatureFilter;

/// Largest accepted patch upscale factor.
pub const MAX_UPSCALE: u32 = 16;

/// Game settings, read from a JSON file. Every field has a default, so `{}`
/// is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub planet: Body,
    /// Directory holding map images and nomenclature files.
    pub data_dir: PathBuf,
    /// Optional JSON file of planet profiles overriding the built-ins.
    pub profiles: Option<PathBuf>,
    pub patch: PatchSize,
    /// Seed for reproducible rounds; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub filter: FeatureFilter,
    pub matcher: NameMatcher,
    /// Integer upscale applied to exported patches, 1 to `MAX_UPSCALE`.
    pub upscale: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            planet: Body::Mars,
            data_dir: PathBuf::from("data"),
            profiles: None,
            patch: PatchSize::default(),
            seed: None,
            filter: FeatureFilter::default(),
            matcher: NameMatcher::default(),
            upscale: 2,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GuesserError::Config(format!("invalid game config: {e}")))?;
        if !(1..=MAX_UPSCALE).contains(&config.upscale) {
            return Err(GuesserError::Config(format!(
                "upscale must be between 1 and {MAX_UPSCALE}, got {}",
                config.upscale
            )));
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GuesserError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }
}
