//! Terminal front end for the planet name-guessing game.
//!
//! Each round writes the patch to show as a PNG, then reads the player's guess
//! from stdin. Type `quit` (or end input) to stop.

mod logging;
mod patch;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use guesser_core::catalog::{self, builtin_features, open_catalog};
use guesser_core::coords::unproject;
use guesser_core::{
    Body, Catalog, Game, GameConfig, GameEvent, GameState, PatchSize, PlanetProfile, PlanetRegistry,
};
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "planet-guesser", about = "Name the planetary surface feature shown in a map patch")]
struct Args {
    /// JSON game config; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Planet to play: mars, moon, venus or mercury
    #[arg(short, long)]
    planet: Option<Body>,

    /// Directory containing map images and nomenclature KMZ files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Nomenclature catalog (.kmz or .kml); defaults to the planet's file in data_dir
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Global map image; defaults to the planet's file in data_dir
    #[arg(long)]
    map: Option<PathBuf>,

    /// JSON list of planet profiles overriding the built-ins
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Patch side length in pixels
    #[arg(long)]
    patch_size: Option<u32>,

    /// Seed for reproducible rounds
    #[arg(long)]
    seed: Option<u64>,

    /// Only pick features at least this wide (km)
    #[arg(long)]
    min_diameter: Option<f64>,

    /// Only pick features of this type, e.g. "crater"
    #[arg(long)]
    feature_type: Option<String>,

    /// Accept guesses without designators like "Crater" or "Mons"
    #[arg(long)]
    strip_designators: bool,

    /// Where round patches are written
    #[arg(short, long, default_value = "patches")]
    output: PathBuf,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u32>,
}

impl Args {
    fn resolve_config(&self) -> Result<GameConfig> {
        let mut cfg = match &self.config {
            Some(path) => GameConfig::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(planet) = self.planet {
            cfg.planet = planet;
        }
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if let Some(profiles) = &self.profiles {
            cfg.profiles = Some(profiles.clone());
        }
        if let Some(side) = self.patch_size {
            cfg.patch = PatchSize::square(side);
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.min_diameter.is_some() {
            cfg.filter.min_diameter_km = self.min_diameter;
        }
        if self.feature_type.is_some() {
            cfg.filter.feature_type = self.feature_type.clone();
        }
        if self.strip_designators {
            cfg.matcher.strip_designators = true;
        }
        Ok(cfg)
    }
}

// ── Setup ────────────────────────────────────────────────────────────────────

/// Load the catalog, falling back to the built-in feature set when the file
/// is missing or unusable.
fn load_catalog(planet: &PlanetProfile, path: &Path) -> Result<Catalog> {
    if path.exists() {
        match open_catalog(path).and_then(|source| catalog::load(planet, source.as_ref())) {
            Ok(c) => return Ok(c),
            Err(e) => warn!(path = %path.display(), error = %e, "catalog unusable, using built-in features"),
        }
    } else {
        warn!(path = %path.display(), "catalog not found, using built-in features");
    }
    catalog::load(planet, &builtin_features(planet.body)).context("Built-in features failed to load")
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

// ── Game loop ────────────────────────────────────────────────────────────────

fn read_guess(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let guess = line.trim();
    if guess.eq_ignore_ascii_case("quit") || guess.eq_ignore_ascii_case("stop") {
        return Ok(None);
    }
    Ok(Some(guess.to_string()))
}

fn play(
    game: &Game<'_>,
    map: &DynamicImage,
    args: &Args,
    upscale: u32,
    rng: &mut StdRng,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let mut state = game.advance(&GameState::idle(), GameEvent::Start, rng)?;
    loop {
        let event = match &state {
            GameState::RoundActive { round, .. } => {
                let img = patch::extract_patch(map, round.region, upscale)?;
                let path = patch::save_patch(&img, &args.output, round.number)?;
                let centre = unproject(game.planet(), round.feature.pixel);
                debug!(round = round.number, lat = centre.lat, lon = centre.lon, "patch centre");

                write!(out, "Round {}: guess the feature in {} > ", round.number, path.display())?;
                out.flush()?;
                match read_guess(input)? {
                    Some(guess) => GameEvent::Guess(guess),
                    None => GameEvent::Quit,
                }
            }
            GameState::Evaluated { round, outcome, score } => {
                if outcome.correct {
                    writeln!(out, "Correct! It was {}", round.feature.name)?;
                } else {
                    writeln!(out, "Wrong! It was {}", round.feature.name)?;
                }
                writeln!(out, "Score: {}/{}", score.points, score.rounds)?;
                match args.rounds {
                    Some(limit) if round.number >= limit => GameEvent::Quit,
                    _ => GameEvent::Next,
                }
            }
            GameState::Idle { final_score } => {
                let score = final_score.unwrap_or_default();
                writeln!(out, "Game stopped! Final Score: {}/{}", score.points, score.rounds)?;
                return Ok(());
            }
        };
        state = game.advance(&state, event, rng)?;
    }
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    logging::init_logging("info");
    let args = Args::parse();
    let cfg = args.resolve_config()?;

    let registry = match &cfg.profiles {
        Some(path) => PlanetRegistry::from_path(path)
            .with_context(|| format!("Failed to load profiles {}", path.display()))?,
        None => PlanetRegistry::builtin(),
    };
    let base = registry.profile(cfg.planet)?.clone();

    let map_path = args.map.clone().unwrap_or_else(|| cfg.data_dir.join(&base.map_image));
    let map = patch::load_map(&map_path, (base.map_width, base.map_height))?;
    let planet = base.with_map_size(map.width(), map.height());

    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| cfg.data_dir.join(&planet.nomenclature_file));
    let catalog = load_catalog(&planet, &catalog_path)?;

    let game = Game::new(&planet, &catalog, cfg.patch)
        .context("Patch size does not fit the map")?
        .with_filter(cfg.filter.clone())
        .with_matcher(cfg.matcher.clone());

    info!(
        planet = %planet.display_name,
        features = catalog.len(),
        skipped = catalog.skipped,
        map = %format!("{}x{}", planet.map_width, planet.map_height),
        "ready"
    );
    println!("{} Name-Guessing Game", planet.display_name);

    let mut rng = make_rng(cfg.seed);
    let stdin = io::stdin();
    play(&game, &map, &args, cfg.upscale, &mut rng, &mut stdin.lock(), &mut io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"planet": "moon", "seed": 1, "patch": {{"width": 50, "height": 50}}}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["planet-guesser", "--config", path.as_str(), "--seed", "9", "--strip-designators"]);
        let cfg = args.resolve_config().unwrap();
        assert_eq!(cfg.planet, Body::Moon);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.patch, PatchSize::square(50));
        assert!(cfg.matcher.strip_designators);
    }

    #[test]
    fn planet_flag_parses_body() {
        let args = Args::parse_from(["planet-guesser", "--planet", "Mercury", "--patch-size", "64"]);
        let cfg = args.resolve_config().unwrap();
        assert_eq!(cfg.planet, Body::Mercury);
        assert_eq!(cfg.patch, PatchSize::square(64));
    }

    #[test]
    fn quit_words_and_eof_end_the_game() {
        let mut input = io::Cursor::new("Gale\nquit\n");
        assert_eq!(read_guess(&mut input).unwrap(), Some("Gale".to_string()));
        assert_eq!(read_guess(&mut input).unwrap(), None);
        assert_eq!(read_guess(&mut input).unwrap(), None);
    }

    #[test]
    fn single_round_writes_patch_and_final_score() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("patches");
        let args = Args::parse_from([
            "planet-guesser",
            "--output",
            output.to_str().unwrap(),
            "--rounds",
            "1",
        ]);

        let planet = PlanetProfile::builtin(Body::Mars);
        let map = patch::load_map(Path::new("/nonexistent/mars.jpg"), (planet.map_width, planet.map_height)).unwrap();
        let catalog = load_catalog(&planet, Path::new("/nonexistent/MARS.kmz")).unwrap();
        let game = Game::new(&planet, &catalog, PatchSize::default()).unwrap();

        let mut input = io::Cursor::new("Gale Crater\n");
        let mut out = Vec::new();
        play(&game, &map, &args, 1, &mut make_rng(Some(3)), &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Round 1: guess the feature in"), "got {text}");
        assert!(text.contains("It was "), "got {text}");
        assert!(text.contains("Final Score: "), "got {text}");
        assert!(text.trim_end().ends_with("/1"), "one round played: {text}");
        assert!(output.join("round_0001.png").exists());
    }

    #[test]
    fn quitting_at_first_prompt_scores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("patches");
        let args = Args::parse_from(["planet-guesser", "--output", output.to_str().unwrap()]);

        let planet = PlanetProfile::builtin(Body::Moon);
        let map = patch::load_map(Path::new("/nonexistent/moon.jpg"), (planet.map_width, planet.map_height)).unwrap();
        let catalog = load_catalog(&planet, Path::new("/nonexistent/MOON.kmz")).unwrap();
        let game = Game::new(&planet, &catalog, PatchSize::default()).unwrap();

        let mut input = io::Cursor::new("quit\n");
        let mut out = Vec::new();
        play(&game, &map, &args, 1, &mut make_rng(Some(5)), &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Final Score: 0/0"), "got {text}");
    }

    #[test]
    fn missing_catalog_falls_back_to_builtin_features() {
        let planet = PlanetProfile::builtin(Body::Venus);
        let catalog = load_catalog(&planet, Path::new("/nonexistent/VENUS.kmz")).unwrap();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.find("north region").is_some());
    }
}
