//! Ristretto CLI - find coffee shops and manage favorites from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Nearby shops around the default location
//! ristretto nearby
//!
//! # Nearby shops around a point
//! ristretto nearby --lat 37.7937 --lng -122.3965 --radius 800
//!
//! # Toggle a favorite, then list favorites
//! ristretto favorite ChIJ...
//! ristretto favorites
//!
//! # Record a visit
//! ristretto visit ChIJ...
//! ```
//!
//! The backend URL and bearer token come from `RISTRETTO_API_URL` and
//! `RISTRETTO_TOKEN` (a `.env` file is honoured). `--api-url` overrides the
//! URL for one invocation.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use ristretto_client::{ApiClient, ClientConfig, parse_api_url};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "ristretto")]
#[command(author, version, about = "Find nearby coffee shops")]
struct Cli {
    /// Backend base URL (overrides `RISTRETTO_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List coffee shops near a point, nearest first
    Nearby {
        /// Latitude of the search centre
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the search centre
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Search radius in meters
        #[arg(long, default_value_t = 500)]
        radius: u32,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        max: u32,
    },
    /// Show details for one shop
    Shop {
        /// Place ID
        id: String,
    },
    /// List favorite shops
    Favorites,
    /// Toggle a shop's favorite status
    Favorite {
        /// Place ID
        id: String,
    },
    /// Remove a shop from favorites
    Unfavorite {
        /// Place ID
        id: String,
    },
    /// Record a visit to a shop
    Visit {
        /// Place ID
        id: String,
    },
    /// List visit history
    Visits,
    /// Show the signed-in user
    Profile,
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = cli.api_url.as_deref() {
        config.api_url = parse_api_url("--api-url", raw)?;
    }
    let client = ApiClient::from_config(&config)?;
    tracing::debug!(api_url = %client.base_url(), "Client ready");

    match cli.command {
        Commands::Nearby {
            lat,
            lng,
            radius,
            max,
        } => commands::shops::nearby(&client, lat.zip(lng), radius, max).await,
        Commands::Shop { id } => commands::shops::show(&client, &id).await,
        Commands::Favorites => commands::favorites::list(&client).await,
        Commands::Favorite { id } => commands::favorites::toggle(&client, &id).await,
        Commands::Unfavorite { id } => commands::favorites::remove(&client, &id).await,
        Commands::Visit { id } => commands::visits::record(&client, &id).await,
        Commands::Visits => commands::visits::list(&client).await,
        Commands::Profile => commands::profile::show(&client).await,
        Commands::Health => commands::health(&client).await,
    }
}
