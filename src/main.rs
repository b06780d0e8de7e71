//! glide-config - Build and validate Valkey GLIDE connection settings
//!
//! Assembles a connection configuration from flags or a YAML file, translates
//! it into the connection request handed to the transport layer, and prints
//! the result. Route expressions given with `--route` are classified as well.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;

use valkey_glide_config::config::{CliArgs, OutputFormat};
use valkey_glide_config::routing::{Route, SlotType};
use valkey_glide_config::wire::ConnectionRequest;

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Route classification as printed by the tool
#[derive(Debug, Serialize)]
struct RouteReport {
    route: Route,
    multi_node: bool,
    slot: Option<u16>,
    slot_type: Option<SlotType>,
}

impl RouteReport {
    fn new(route: Route) -> Self {
        Self {
            multi_node: route.is_multi_node(),
            slot: route.slot(),
            slot_type: route.slot_type(),
            route,
        }
    }

    fn describe(&self) -> String {
        let fanout = if self.multi_node { "multi-node" } else { "single-node" };
        match (self.slot, self.slot_type) {
            (Some(slot), Some(slot_type)) => format!(
                "{} -> {} (slot {}, {})",
                self.route,
                fanout,
                slot,
                slot_type.as_str()
            ),
            _ => format!("{} -> {}", self.route, fanout),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    connection_request: &'a ConnectionRequest,
    routes: &'a [RouteReport],
}

fn print_text(request: &ConnectionRequest, routes: &[RouteReport]) {
    println!("glide-config v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("{}", request.summary());
    if !routes.is_empty() {
        println!("------------------------------------");
        for report in routes {
            println!("Route: {}", report.describe());
        }
    }
    println!("====================================");
}

fn run() -> Result<()> {
    let args = CliArgs::parse_args();

    setup_logging(args.verbose, args.quiet)?;

    let mut config = args
        .to_connection_config()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    debug!("Built {} configuration", if config.is_cluster() { "cluster" } else { "standalone" });

    let request = config
        .to_wire_descriptor()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let routes = args
        .routes
        .iter()
        .map(|text| {
            text.parse::<Route>()
                .map(RouteReport::new)
                .with_context(|| format!("Invalid route '{}'", text))
        })
        .collect::<Result<Vec<_>>>()?;

    match args.output_format {
        OutputFormat::Text => print_text(&request, &routes),
        OutputFormat::Json => {
            let report = Report {
                connection_request: &request,
                routes: &routes,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
