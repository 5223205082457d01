use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;

use route_sim::{Cost, RouterId};
use route_sim::config::SimulationConfig;
use route_sim::protocol::{NextHopLookup, Protocol, get_forwarding_table, get_route};

#[derive(Parser)]
#[command(name = "route-sim", about = "Distance-Vector and Link-State routing simulator")]
struct Cli {
    /// JSON file holding router coordinates and simulation parameters
    #[arg(long, required = true)]
    config: String,

    #[arg(long)]
    drop_fraction: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    protocol: Option<Protocol>,

    /// Print the forwarding table of this router
    #[arg(long)]
    table: Option<RouterId>,

    /// Print the route between two routers
    #[arg(long, num_args = 2, value_names = ["SRC", "DST"])]
    route: Option<Vec<RouterId>>,

    /// Write the run reports as JSON
    #[arg(long)]
    export: Option<String>,

    /// Write the effective configuration (after overrides) to this file
    #[arg(long)]
    save_config: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn print_table<T: NextHopLookup>(
    label: &str,
    table: &T,
    router: RouterId,
    costs: Option<&BTreeMap<RouterId, Cost>>,
) -> Result<()> {
    let entries = get_forwarding_table(table, router)?;
    println!("[{label}] Forwarding table for router {router}:");
    println!("Destination -> Next hop");
    for (dest, hop) in entries {
        let hop = hop.map_or_else(|| "-".to_string(), |h| h.to_string());
        match costs.and_then(|c| c.get(&dest)).filter(|c| c.is_finite()) {
            Some(cost) => println!("  {dest:5}      ->   {hop:5}  ({cost:.1} km)"),
            None => println!("  {dest:5}      ->   {hop}"),
        }
    }
    Ok(())
}

fn print_route<T: NextHopLookup>(label: &str, table: &T, src: RouterId, dst: RouterId) -> Result<()> {
    match get_route(table, src, dst)? {
        Some(path) => {
            let hops: Vec<String> = path.iter().map(ToString::to_string).collect();
            println!("[{label}] Route from {src} to {dst}: {}", hops.join(" -> "));
        }
        None => println!("[{label}] No route from {src} to {dst}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut config = SimulationConfig::load(&cli.config)?;
    if let Some(drop_fraction) = cli.drop_fraction {
        config.drop_fraction = drop_fraction;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(protocol) = cli.protocol {
        config.protocol = protocol;
    }

    if let Some(path) = &cli.save_config {
        config.save(path)?;
        info!("Saved effective configuration to {}", path);
    }

    info!(
        "Simulating {} over {} routers (drop fraction {})",
        config.protocol,
        config.node_set().len(),
        config.drop_fraction
    );

    let outcome = config.run()?;
    info!(
        "Topology: {} routers, {} links",
        outcome.graph.router_count(),
        outcome.graph.link_count()
    );
    if !outcome.graph.is_connected() {
        warn!("Topology is disconnected; some destinations are unreachable");
    }

    let route = cli.route.as_deref().and_then(|r| match r {
        [src, dst] => Some((*src, *dst)),
        _ => None,
    });

    if let Some(dv) = &outcome.distance_vector {
        println!("Total DV messages sent: {}", dv.messages);
        println!("Rounds until convergence: {}", dv.rounds);
        if let Some(router) = cli.table {
            print_table("DV", &dv.next_hops, router, dv.distances.row(router))?;
        }
        if let Some((src, dst)) = route {
            print_route("DV", &dv.next_hops, src, dst)?;
        }
    }

    if let Some(ls) = &outcome.link_state {
        println!("Total LSAs sent: {}", ls.flooding.messages);
        println!("Rounds until convergence: {}", ls.flooding.rounds);
        if ls.flooding.is_stalled() {
            println!("Flooding stalled: the network is disconnected");
        }
        if let Some(router) = cli.table {
            print_table("LS", &ls.forwarding, router, None)?;
        }
        if let Some((src, dst)) = route {
            print_route("LS", &ls.forwarding, src, dst)?;
        }
    }

    let reports = outcome.reports();
    for report in &reports {
        info!(
            "{}: {} reachable router pairs after {} rounds",
            report.protocol,
            report.reachable_pairs(),
            report.rounds
        );
    }

    if let Some(path) = cli.export {
        fs::write(&path, serde_json::to_string_pretty(&reports)?)
            .with_context(|| format!("failed to write report to {path}"))?;
        info!("Wrote {} reports to {}", reports.len(), path);
    }

    Ok(())
}
