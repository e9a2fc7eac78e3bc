// NetPlan: Multilayer Network Planning Model
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use netplan::example_networks;
use netplan::model::*;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    // run clap
    let args = CommandLineArguments::parse();

    // initialize the env logger
    pretty_env_logger::init();

    let config = NetPlanConfig::default()
        .tolerance(args.tolerance)
        .hop_bound_factor(args.hop_factor)
        .check_caches(args.check_caches);

    // match on the action
    match args.cmd {
        MainCommand::Summary { file } => {
            let np = NetPlan::load_from_file(&file, config)?;
            println!("{}", printer::summary(&np)?.join("\n"));
        }
        MainCommand::Check { file } => {
            let np = NetPlan::load_from_file(&file, config)?;
            np.check_caches_consistency()?;
            for layer in np.get_layers_top_down()? {
                for link in np.get_links_oversubscribed(layer)? {
                    warn!("Link is oversubscribed: {}", printer::link(&np, link)?);
                }
                for route in np.get_routes_down(layer)? {
                    warn!("Route is down: {}", printer::route(&np, route)?);
                }
            }
            println!("{}: consistent", file.display());
        }
        MainCommand::FailureImpact { file, srg } => {
            let np = NetPlan::load_from_file(&file, config)?;
            let srgs: Vec<SrgId> = match srg {
                Some(id) => vec![SrgId(id)],
                None => np.get_srgs().map(|s| s.id()).collect(),
            };
            if srgs.is_empty() {
                info!("The plan has no shared risk groups");
            }
            for srg in srgs {
                let affected = np.get_affected_links_all_layers(srg)?;
                println!("{:?}: {} links affected", srg, affected.len());
                for link in affected {
                    println!("    {}", printer::link(&np, link)?);
                }
            }
        }
        MainCommand::TraceDemand { file, demand, direction, include_backup } => {
            let np = NetPlan::load_from_file(&file, config)?;
            let demand = DemandId(demand);
            println!("{}", printer::demand(&np, demand)?);
            let closure = np.get_propagation_closure(
                &[PropagationSeed::Demand(demand)],
                direction.into(),
                include_backup,
            )?;
            println!("{}", printer::closure(&np, &closure)?.join("\n"));
        }
        MainCommand::Example { name, variant, output } => {
            let np = example_networks::by_name(&name, variant)
                .ok_or_else(|| format!("Unknown example {} (variant {})", name, variant))?;
            match output {
                Some(path) => np.save_to_file(path)?,
                None => println!("{}", np.to_json_string()?),
            }
        }
    }
    Ok(())
}

/// Command-line tool to inspect multilayer network plans stored as JSON. All commands only read
/// the plan; use `example` to generate a plan to start from.
#[derive(Parser, Debug)]
#[command(name = "NetPlan", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Tolerance by which the forwarding fractions leaving a node may exceed 1
    #[arg(long, global = true, default_value_t = 1e-3)]
    tolerance: f64,
    /// Hop-by-hop traffic must reach its destination within this factor times the number of nodes
    #[arg(long = "hop-factor", global = true, default_value_t = 2)]
    hop_factor: usize,
    /// Check the caches after every modification of the plan
    #[arg(short = 'c', long, global = true)]
    check_caches: bool,
    /// Action to perform
    #[command(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Print the traffic summary of every layer
    #[command(name = "summary")]
    Summary {
        /// Plan to load
        file: PathBuf,
    },
    /// Load the plan, check its consistency, and report oversubscribed links and routes which
    /// are down
    #[command(name = "check")]
    Check {
        /// Plan to load
        file: PathBuf,
    },
    /// Print all links of all layers affected by the failure of shared risk groups
    #[command(name = "failure-impact")]
    FailureImpact {
        /// Plan to load
        file: PathBuf,
        /// Identifier of the shared risk group. If omitted, all groups are analyzed.
        #[arg(short = 's', long)]
        srg: Option<u64>,
    },
    /// Follow the traffic of a demand through all layers
    #[command(name = "trace-demand")]
    TraceDemand {
        /// Plan to load
        file: PathBuf,
        /// Identifier of the demand
        demand: u64,
        /// Direction in which couplings are followed
        #[arg(short = 'd', long, value_enum, default_value_t = Direction::Both)]
        direction: Direction,
        /// Follow backup routes as well
        #[arg(short = 'b', long)]
        include_backup: bool,
    },
    /// Write one of the example plans as JSON
    #[command(name = "example")]
    Example {
        /// Name of the example (triangle, two-layer, protected, aggregation or random)
        name: String,
        /// Variant of the example (the seed for the random example)
        #[arg(short = 'v', long, default_value_t = 0)]
        variant: usize,
        /// Store the plan in this file instead of printing it
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Down,
    Up,
    Both,
}

impl From<Direction> for PropagationDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Down => Self::Downward,
            Direction::Up => Self::Upward,
            Direction::Both => Self::Both,
        }
    }
}
