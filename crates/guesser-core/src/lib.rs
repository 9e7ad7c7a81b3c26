//! Planetary nomenclature feature locator.
//!
//! Loads a planet's named surface features, picks one at random, projects it
//! onto the planet's equirectangular global map and computes the patch to
//! show the player. The round state machine in [`game`] ties these together.

pub mod catalog;
pub mod config;
pub mod coords;
pub mod crop;
pub mod error;
pub mod game;
pub mod planet;
pub mod selector;

pub use catalog::{Catalog, FeatureDataSource, FeatureRecord, Placemark};
pub use config::GameConfig;
pub use coords::{project, LatLon, PixelCoord};
pub use crop::{CropRegion, PatchSize};
pub use error::{GuesserError, Result};
pub use game::{Game, GameEvent, GameState, NameMatcher, Score};
pub use planet::{Body, LonConvention, PlanetProfile, PlanetRegistry};
pub use selector::{select, FeatureFilter, RandomSource};
