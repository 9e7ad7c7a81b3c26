//! Catalog inspection tool: loads nomenclature catalogs and writes a JSON
//! manifest of what survived validation, per planet.
//!
//! Useful for checking a freshly downloaded KMZ before playing with it.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use guesser_core::catalog::{self, open_catalog};
use guesser_core::{Body, Catalog, PlanetProfile, PlanetRegistry};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "catalog_inspect",
    about = "Validate nomenclature catalogs and summarise them as JSON"
)]
struct Args {
    /// Directory containing the *_nomenclature_center_pts.kmz files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON list of planet profiles overriding the built-ins
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Inspect only this planet (omit to inspect all four)
    #[arg(long)]
    planet: Option<Body>,

    /// Manifest output path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of type tags to list per planet
    #[arg(long, default_value = "10")]
    top_types: usize,
}

// ── Manifest ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Manifest {
    catalogs: Vec<CatalogSummary>,
}

#[derive(Serialize)]
struct CatalogSummary {
    planet: Body,
    source: String,
    features: usize,
    skipped: usize,
    duplicates: usize,
    /// Equatorial ground resolution of the profile's map.
    km_per_pixel: f64,
    with_diameter: usize,
    max_diameter_km: Option<f64>,
    top_types: Vec<(String, usize)>,
}

fn summarise(
    profile: &PlanetProfile,
    catalog: &Catalog,
    source: String,
    top_types: usize,
) -> CatalogSummary {
    let diameters: Vec<f64> = catalog.features.iter().filter_map(|f| f.diameter_km).collect();
    let max_diameter_km = diameters.iter().cloned().reduce(f64::max);
    let mut types = catalog.type_histogram();
    types.truncate(top_types);

    CatalogSummary {
        planet: catalog.body,
        source,
        features: catalog.len(),
        skipped: catalog.skipped,
        duplicates: catalog.duplicates,
        km_per_pixel: profile.km_per_pixel(),
        with_diameter: diameters.len(),
        max_diameter_km,
        top_types: types,
    }
}

fn inspect(profile: &PlanetProfile, args: &Args) -> Result<Option<CatalogSummary>> {
    let path = args.data_dir.join(&profile.nomenclature_file);
    if !path.exists() {
        warn!(path = %path.display(), "missing catalog, skipping");
        return Ok(None);
    }
    let source = open_catalog(&path)?;
    let catalog = catalog::load(profile, source.as_ref())
        .with_context(|| format!("Catalog failed: {}", path.display()))?;
    info!(
        planet = %profile.body,
        features = catalog.len(),
        skipped = catalog.skipped,
        duplicates = catalog.duplicates,
        "inspected"
    );
    Ok(Some(summarise(profile, &catalog, path.display().to_string(), args.top_types)))
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let registry = match &args.profiles {
        Some(path) => PlanetRegistry::from_path(path)?,
        None => PlanetRegistry::builtin(),
    };

    let bodies: Vec<Body> = match args.planet {
        Some(b) => vec![b],
        None => Body::ALL.to_vec(),
    };

    let mut catalogs = Vec::new();
    for body in bodies {
        if let Some(summary) = inspect(registry.profile(body)?, &args)? {
            catalogs.push(summary);
        }
    }

    let json = serde_json::to_string_pretty(&Manifest { catalogs })?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Write failed: {}", path.display()))?;
            info!(path = %path.display(), "manifest written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
