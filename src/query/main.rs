//! Query tool for country boundaries.
//!
//! Loads a serialized boundaries file and answers point, bounding box and CSV
//! batch lookups. Results go to stdout as JSON (or CSV for batches), logs to stderr.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use country_boundaries::{BoundingBox, CountryBoundaries, PipService};

mod batch;
mod config;
mod data;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Look up which countries and subdivisions contain a position")]
struct Args {
    /// Serialized boundaries file (overrides the config file)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ids of the regions at a position, smallest first
    Ids {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
    /// Whether a position is in any of the given regions
    IsIn {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Region id, may be repeated
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
    /// Regions containing and possibly intersecting a bounding box
    Bbox {
        /// Bounding box: "minLon,minLat,maxLon,maxLat"
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,
    },
    /// Look up every lon,lat row of a CSV file
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        /// Output CSV (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Raster dimensions of the loaded data
    Stats,
}

#[derive(Serialize)]
struct BboxResponse<'a> {
    containing_ids: Vec<&'a str>,
    intersecting_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct StatsResponse {
    raster_width: usize,
    raster_height: usize,
    cells: usize,
    sized_regions: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // Initialize logging
    let default_level = config.log.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_path = args
        .data
        .clone()
        .or(config.data.path)
        .context("No boundaries file given (use --data or [data] path in the config file)")?;

    let boundaries = data::load_boundaries(&data_path)?;

    match args.command {
        Command::Ids { lon, lat } => {
            let ids = boundaries.get_ids(lon, lat)?;
            println!("{}", serde_json::to_string(&ids)?);
        }
        Command::IsIn { lon, lat, ids } => {
            let is_in = boundaries.is_in_any(lon, lat, &ids)?;
            println!("{}", serde_json::to_string(&is_in)?);
        }
        Command::Bbox { bbox } => {
            let bbox = BoundingBox::parse(&bbox)?;
            let result = boundaries.query_bbox(&bbox)?;
            let mut response = BboxResponse {
                containing_ids: result.containing_ids.into_iter().collect(),
                intersecting_ids: result.intersecting_ids.into_iter().collect(),
            };
            response.containing_ids.sort_unstable();
            response.intersecting_ids.sort_unstable();
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::Batch { input, output } => {
            let service = PipService::new(Arc::new(boundaries));
            let input_file = File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;

            let stats = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    batch::run_batch(&service, input_file, BufWriter::new(file))?
                }
                None => batch::run_batch(&service, input_file, io::stdout().lock())?,
            };
            info!("Looked up {} points ({} failed)", stats.points, stats.failed);
        }
        Command::Stats => {
            println!("{}", serde_json::to_string(&stats(&boundaries))?);
        }
    }

    Ok(())
}

fn stats(boundaries: &CountryBoundaries) -> StatsResponse {
    StatsResponse {
        raster_width: boundaries.raster_width(),
        raster_height: boundaries.raster_height(),
        cells: boundaries.cell_count(),
        sized_regions: boundaries.geometry_sizes().len(),
    }
}
