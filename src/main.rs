#![warn(non_snake_case)]
//! # dungeon-forge
//!
//! Command line front end for the dungeon generator. Generates one layout for a
//! seed and exports it as JSON, a PNG preview or an ASCII dump, or runs a batch
//! of consecutive seeds in parallel and validates every result.
//!
//! Set `RUST_LOG=debug` for per-step logging.

use clap::Parser;
use dungeon_forge::carve::CarveMode;
use dungeon_forge::document::check_layout;
use dungeon_forge::{GeneratorConfig, ProceduralGenerator, Theme};
use log::{error, info};
use rayon::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dungeon-forge", version, about = "Deterministic BSP dungeon generator")]
struct Cli {
    /// Seed of the (first) layout.
    #[arg(long, default_value_t = 54321)]
    seed: u64,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Number of rooms to request.
    #[arg(long)]
    rooms: Option<usize>,

    /// `corridor` or `portal`.
    #[arg(long)]
    mode: Option<CarveMode>,

    /// Generator configuration (JSON). Flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Theme descriptor (JSON). Defaults to the built-in palette.
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Room indices to turn into environmental hazard rooms, e.g. `2,4`.
    #[arg(long, value_delimiter = ',')]
    hazard_rooms: Vec<usize>,

    /// Write the layout as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write a PNG preview.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per cell in the PNG preview.
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Print the layout as text.
    #[arg(long)]
    ascii: bool,

    /// Generate this many consecutive seeds in parallel and validate them.
    #[arg(long)]
    batch: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> Result<GeneratorConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(w) = self.width {
            config.map_width = w;
        }
        if let Some(h) = self.height {
            config.map_height = h;
        }
        if let Some(n) = self.rooms {
            config.room_count = n;
        }
        if let Some(mode) = self.mode {
            config.carve_mode = mode;
        }
        if !self.hazard_rooms.is_empty() {
            config.hazard_rooms = self.hazard_rooms.clone();
        }
        Ok(config)
    }

    fn load_theme(&self) -> Result<Theme, Box<dyn Error>> {
        Ok(match &self.theme {
            Some(path) => Theme::from_json_file(path)?,
            None => Theme::default(),
        })
    }
}

fn run_batch(generator: &ProceduralGenerator, first: u64, count: u64) -> usize {
    let failures: Vec<(u64, String)> = (first..first.saturating_add(count))
        .into_par_iter()
        .filter_map(|seed| match generator.generate(seed) {
            Ok(layout) => {
                let violations = check_layout(&layout);
                if violations.is_empty() {
                    None
                } else {
                    let text: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                    Some((seed, text.join("; ")))
                }
            }
            Err(e) => Some((seed, e.to_string())),
        })
        .collect();

    for (seed, reason) in &failures {
        error!("Seed {} failed: {}", seed, reason);
    }
    info!("Batch of {} seeds: {} failed", count, failures.len());
    failures.len()
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.load_config()?;
    let theme = cli.load_theme()?;
    let generator = ProceduralGenerator::new(config, theme)?;

    if let Some(count) = cli.batch {
        let failed = run_batch(&generator, cli.seed, count);
        println!("{} of {} seeds passed validation", count.saturating_sub(failed as u64), count);
        if failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    let layout = generator.generate(cli.seed)?;
    if cli.ascii {
        print!("{}", layout.to_ascii());
    }
    if let Some(path) = &cli.json {
        layout.save_json(path)?;
        info!("Layout written to {}", path.display());
    }
    if let Some(path) = &cli.png {
        write_preview(&layout, path, cli.scale)?;
    }

    for brief in layout.briefs() {
        println!(
            "room {:>2}  {:<20}  {:?}{}{}",
            brief.index,
            brief.archetype.to_string(),
            brief.directions,
            if brief.is_start { "  start" } else { "" },
            if brief.is_boss { "  boss" } else { "" },
        );
    }
    Ok(())
}

#[cfg(feature = "preview")]
fn write_preview(layout: &dungeon_forge::DungeonLayout, path: &Path, scale: u32) -> Result<(), Box<dyn Error>> {
    dungeon_forge::bsp::debug_viz::save_png(layout, path, scale)?;
    Ok(())
}

#[cfg(not(feature = "preview"))]
fn write_preview(_layout: &dungeon_forge::DungeonLayout, path: &Path, _scale: u32) -> Result<(), Box<dyn Error>> {
    error!("Built without the `preview` feature; {} not written", path.display());
    Ok(())
}
