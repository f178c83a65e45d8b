//! `detourctl`: plan routes around blockages and manage the blockage file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use detour_planner::config::Config;
use detour_planner::handler::{self, HandlerResponse};
use detour_planner::here::HereClient;
use detour_planner::polyline::Polyline;
use detour_planner::store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Blockage store file (overrides BLOCKAGE_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Routing provider base URL (overrides HERE_ROUTER_URL)
    #[arg(long, global = true)]
    router_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route around active blockages
    Route {
        /// Origin as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        from: String,
        /// Destination as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        to: String,
        /// Ignore blockages
        #[arg(long)]
        no_avoid: bool,
        /// Also print the decoded route points
        #[arg(long)]
        decode: bool,
    },
    /// Decode an encoded route polyline
    Decode { polyline: String },
    /// Manage blockages
    #[command(subcommand)]
    Blockage(BlockageCommand),
}

#[derive(Subcommand, Debug)]
enum BlockageCommand {
    /// Report a blockage
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Radius in meters
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List blockages
    List {
        /// Include inactive blockages
        #[arg(long)]
        all: bool,
    },
    /// Delete a blockage
    Delete { id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("detour_planner=info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(url) = cli.router_url {
        config.here.base_url = url;
    }

    let response = match cli.command {
        Command::Decode { polyline } => {
            let polyline = Polyline::decode(&polyline).context("cannot decode polyline")?;
            println!("{}", serde_json::to_string_pretty(&polyline.points())?);
            return Ok(());
        }
        Command::Route {
            from,
            to,
            no_avoid,
            decode,
        } => {
            let (from, to) = (parse_point(&from)?, parse_point(&to)?);
            let store = JsonFileStore::open(&config.store_path)
                .with_context(|| format!("cannot open {}", config.store_path.display()))?;
            let client = HereClient::new(config.here.clone()).context("cannot build HTTP client")?;
            let body = json!({
                "origin": [from.1, from.0],
                "destination": [to.1, to.0],
                "avoidBlockages": !no_avoid,
            });
            let mut response = handler::calculate_route(&store, &client, &body.to_string(), Utc::now());
            if decode && response.is_success() {
                attach_points(&mut response)?;
            }
            response
        }
        Command::Blockage(command) => {
            let store = JsonFileStore::open(&config.store_path)
                .with_context(|| format!("cannot open {}", config.store_path.display()))?;
            match command {
                BlockageCommand::Add {
                    lat,
                    lng,
                    radius,
                    description,
                } => {
                    let body = json!({
                        "latitude": lat,
                        "longitude": lng,
                        "radius": radius,
                        "description": description,
                        "reportedBy": "detourctl",
                    });
                    handler::add_blockage(&store, &body.to_string(), Utc::now())
                }
                BlockageCommand::List { all } => handler::list_blockages(&store, !all, Utc::now()),
                BlockageCommand::Delete { id } => handler::delete_blockage(&store, Some(id.as_str())),
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        anyhow::bail!("request failed with status {}", response.status);
    }
    Ok(())
}

/// Decodes the returned polyline; a route that cannot be decoded is an error,
/// never drawn as a straight line.
fn attach_points(response: &mut HandlerResponse) -> Result<()> {
    let encoded = response.body["route"]["polyline"]
        .as_str()
        .context("response has no polyline")?;
    let polyline = Polyline::decode(encoded).context("provider returned an undecodable route")?;
    response.body["route"]["points"] = serde_json::to_value(polyline.points())?;
    Ok(())
}

fn parse_point(text: &str) -> Result<(f64, f64)> {
    let (lat, lng) = text
        .split_once(',')
        .with_context(|| format!("expected \"lat,lng\", got {text:?}"))?;
    let lat = lat.trim().parse::<f64>().with_context(|| format!("bad latitude in {text:?}"))?;
    let lng = lng.trim().parse::<f64>().with_context(|| format!("bad longitude in {text:?}"))?;
    Ok((lat, lng))
}
