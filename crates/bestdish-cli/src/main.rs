mod browse;
mod labels;
mod nearby;

use std::sync::Arc;

use bestdish_core::{AppConfig, Coordinate};
use bestdish_yelp::{CachePolicy, ClientOptions, GeoCache, NearbyService, YelpClient};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::labels::LabelsCommands;

#[derive(Debug, Parser)]
#[command(name = "bestdish")]
#[command(about = "Find nearby restaurants and label dish photos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List restaurants near a location, optionally filtered by name
    Nearby {
        #[command(flatten)]
        at: LocationArgs,
        /// Case-insensitive name filter applied to the fetched list
        #[arg(long)]
        query: Option<String>,
    },
    /// Search the remote directory for a term near a location
    Search {
        #[command(flatten)]
        at: LocationArgs,
        /// Search term (e.g., "ramen")
        #[arg(long)]
        term: String,
    },
    /// Interactive browsing: type to filter, `:at LAT LON` to move
    Browse {
        #[command(flatten)]
        at: LocationArgs,
    },
    /// Manage labeled dish photos
    Labels {
        #[command(subcommand)]
        command: LabelsCommands,
    },
}

#[derive(Debug, Clone, Copy, Args)]
struct LocationArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
}

impl LocationArgs {
    fn coordinate(self) -> anyhow::Result<Coordinate> {
        let coord = Coordinate::new(self.lat, self.lon);
        anyhow::ensure!(coord.is_valid(), "invalid coordinate {coord}");
        Ok(coord)
    }
}

fn build_nearby_service(config: &AppConfig) -> anyhow::Result<NearbyService> {
    let client = YelpClient::with_base_url(
        config.require_yelp_api_key()?,
        &config.yelp_base_url,
        ClientOptions::from_app_config(config),
    )?;
    let cache = GeoCache::new(CachePolicy::from_app_config(config));
    Ok(NearbyService::new(client, cache))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Reads `.env` first; the Yelp key is only checked by network commands.
    let config = bestdish_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Nearby { at, query } => {
            let service = build_nearby_service(&config)?;
            nearby::run_nearby(&service, at.coordinate()?, query.as_deref()).await?;
        }
        Commands::Search { at, term } => {
            let service = build_nearby_service(&config)?;
            nearby::run_search(service.client(), at.coordinate()?, &term).await?;
        }
        Commands::Browse { at } => {
            let service = Arc::new(build_nearby_service(&config)?);
            browse::run_browse(service, &config, at.coordinate()?).await?;
        }
        Commands::Labels { command } => {
            let store = bestdish_store::LabelStore::new(config.label_store_dir.clone());
            labels::run_labels(&store, command).await?;
        }
    }

    Ok(())
}
