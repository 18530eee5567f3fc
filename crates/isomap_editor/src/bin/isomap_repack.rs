//! Re-encode the terrain and overlay packs of a map file
//!
//! Run with: isomap-repack <config.json> <input.map> [output.map]
//!
//! The packs are decoded, then written back in canonical order. Every other
//! section of the map is kept as it was. Without an output path the input
//! file is overwritten.

use std::path::PathBuf;
use std::process::ExitCode;

use isomap_editor::{EditorConfig, Map};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, input, output) = match args.as_slice() {
        [config, input] => (PathBuf::from(config), PathBuf::from(input), PathBuf::from(input)),
        [config, input, output] => (
            PathBuf::from(config),
            PathBuf::from(input),
            PathBuf::from(output),
        ),
        _ => {
            eprintln!("Usage: isomap-repack <config.json> <input.map> [output.map]");
            return ExitCode::FAILURE;
        }
    };

    let config = match EditorConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let (mut map, report) = match Map::load(&input, &config.theater) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load map {}: {}", input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "{} ({}): {} cells, {} tile records placed",
        input.display(),
        map.size(),
        map.grid().cell_count(),
        report.tiles.placed
    );
    if report.tiles.skipped() > 0 {
        warn!("{} tile records were skipped", report.tiles.skipped());
    }
    match &report.overlays {
        Some(overlays) => info!(
            "{} overlays placed, {} unknown types, {} without a cell",
            overlays.placed, overlays.unknown_type, overlays.missing_cell
        ),
        None => info!("Map has no overlay pack"),
    }

    if let Err(e) = map.save(&output) {
        error!("Failed to save map {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
