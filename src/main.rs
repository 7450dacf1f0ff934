//! # Butterfly-directions CLI
//!
//! Command-line interface for the butterfly-directions library.
//! Prints turn-by-turn directions between two points across a site's way
//! network and public roads.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use butterfly_directions::{GraphNetwork, Plan, Point, RoutingMachine, RoutingOptions};
use clap::Parser;
use log::error;

mod cli;

/// Command-line interface for butterfly-directions
#[derive(Parser)]
#[command(name = "butterfly-directions")]
#[command(about = "Turn-by-turn directions across a private way network and public roads")]
#[command(long_about = "Routes between two lon,lat points:
  butterfly-directions --network site.json --from -100.3884,47.1399 --to -100.3749,47.1333
  butterfly-directions --network site.json --config directions.toml --from ... --to ... --json

Endpoints further than --max-snap meters from the way network are routed on
public roads through the first configured entrance (Mapbox access token required).")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Way network JSON document (nodes and edges)
    #[arg(long)]
    network: PathBuf,

    /// Start point as "lon,lat"
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: Point,

    /// End point as "lon,lat"
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: Point,

    /// Routing options TOML file (max_snap, entrances, remote)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the snapping threshold in meters
    #[arg(long)]
    max_snap: Option<f64>,

    /// Mapbox access token
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Print the route as a GeoJSON Feature instead of instructions
    #[arg(long)]
    json: bool,

    /// Show how the request would be routed without computing it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Parse a "lon,lat" pair
fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lon,lat\", got \"{s}\""))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude \"{lon}\": {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude \"{lat}\": {e}"))?;
    Ok([lon, lat])
}

/// Options from the config file, with command-line overrides applied
fn resolve_options(
    config: Option<&PathBuf>,
    max_snap: Option<f64>,
    access_token: Option<String>,
) -> Result<RoutingOptions> {
    let mut options = match config {
        Some(path) => RoutingOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => RoutingOptions::default(),
    };

    if let Some(max_snap) = max_snap {
        options.max_snap = max_snap;
    }
    if let Some(token) = access_token {
        options.remote.access_token = token;
    }
    options.validate()?;

    Ok(options)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-directions v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    let options = resolve_options(cli.config.as_ref(), cli.max_snap, cli.access_token.clone())?;
    let network = GraphNetwork::load(&cli.network)
        .with_context(|| format!("failed to load network from {}", cli.network.display()))?;
    if cli.verbose {
        eprintln!(
            "🗺️  Loaded {} nodes from {}",
            network.node_count(),
            cli.network.display()
        );
    }

    let machine = RoutingMachine::with_mapbox(Arc::new(network), options);

    if cli.dry_run {
        let plan = machine.plan(cli.from, cli.to)?;
        eprintln!("🔍 [DRY RUN] Would route {}", describe_plan(&plan));
        return Ok(());
    }

    let progress = cli::ProgressManager::new("🧭 Computing directions", cli.json);
    let result = machine.get_directions(cli.from, cli.to).await;
    progress.finish();
    let route = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&route.to_geojson())?);
    } else {
        for line in cli::render::instruction_lines(&route) {
            println!("{line}");
        }
        eprintln!(
            "✅ {} maneuvers, {} points",
            route.maneuvers.len(),
            route.geometry.len()
        );
    }

    Ok(())
}

/// Human-readable summary of a plan
fn describe_plan(plan: &Plan) -> String {
    match plan {
        Plan::Local { from, to } => format!("{}: node {} -> node {}", plan.label(), from.id, to.id),
        Plan::Remote {
            origin,
            destination,
        } => format!("{}: {origin:?} -> {destination:?}", plan.label()),
        Plan::Enter { origin, to } => {
            format!("{}: {origin:?} -> entrance -> node {}", plan.label(), to.id)
        }
        Plan::Exit { from, destination } => {
            format!("{}: node {} -> entrance -> {destination:?}", plan.label(), from.id)
        }
    }
}
