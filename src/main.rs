use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use subnet_routing::Network;
use subnet_routing::config::TopologyConfig;

#[derive(Parser)]
#[command(name = "subnet-routing", about = "Route packets through a subnet topology")]
struct Cli {
    /// JSON topology description
    #[arg(long)]
    topology: PathBuf,

    /// Source address of the packet
    #[arg(long, requires = "to")]
    from: Option<Ipv4Addr>,

    /// Destination address of the packet
    #[arg(long, requires = "from")]
    to: Option<Ipv4Addr>,

    /// Print every subnet with its range and systems
    #[arg(long)]
    subnets: bool,

    /// Print every router's table
    #[arg(long)]
    tables: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()))
        .init();

    let config = TopologyConfig::load_from_file(&cli.topology)?;
    let network = config
        .build()
        .with_context(|| format!("invalid topology in {}", cli.topology.display()))?;
    info!(
        "Topology ready, routes converged in {} passes",
        network.routes().last_report().map(|report| report.passes).unwrap_or(0)
    );

    if cli.subnets {
        print_subnets(&network)?;
    }
    if cli.tables {
        print_tables(&network);
    }

    if let (Some(from), Some(to)) = (cli.from, cli.to) {
        let path = network.send_packet(from, to)?;
        let hops: Vec<String> = path.iter().map(Ipv4Addr::to_string).collect();
        println!("{}", hops.join(" "));
    }

    Ok(())
}

fn print_subnets(network: &Network) -> Result<()> {
    for cidr in network.list_subnets() {
        let (first, last) = network.list_range(&cidr)?;
        let systems: Vec<String> = network
            .list_systems(&cidr)?
            .iter()
            .map(Ipv4Addr::to_string)
            .collect();
        println!("{} [{} - {}] {}", cidr, first, last, systems.join(" "));
    }
    Ok(())
}

fn print_tables(network: &Network) {
    for table in network.routes().tables() {
        println!("Router {} ({})", table.owner(), table.home());
        for (cidr, hops) in table.iter() {
            let hops: Vec<String> = hops.iter().map(Ipv4Addr::to_string).collect();
            println!("  {} via {}", cidr, hops.join(" -> "));
        }
    }
}
