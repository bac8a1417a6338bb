mod commands;

use crate::commands::{apportion, info, tabulate, TabulateOverrides};
use clap::{Parser, Subcommand};
use election_engine::apportion::ApportionMethod;
use election_engine::system::ElectoralSystem;
use std::path::PathBuf;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and dump info about an election file.
    Info {
        /// Election file (JSON, optionally .gz)
        file: PathBuf,
    },
    /// Count an election file and print the results.
    Tabulate {
        /// Election file (JSON, optionally .gz)
        file: PathBuf,
        /// Override the file's system (e.g. "irv", "listpr:dhondt")
        #[clap(long)]
        system: Option<ElectoralSystem>,
        /// Override the seats per district
        #[clap(long)]
        seats: Option<u32>,
        /// Seed for tie-breaks and random spreads
        #[clap(long)]
        seed: Option<u64>,
        /// Print the round-by-round count
        #[clap(long, short)]
        verbose: bool,
        /// Write the report as JSON (.gz to compress)
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Apportion seats over a JSON vote tally.
    Apportion {
        /// JSON object of party to votes
        tally: PathBuf,
        #[clap(long)]
        seats: u32,
        /// "dhondt", "sainte-lague", "huntington-hill",
        /// "largest-remainder[hare|droop]" or "highest-averages[<divisor>]"
        #[clap(long, default_value = "dhondt")]
        method: ApportionMethod,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let opts = Opts::parse();

    let result = match opts.command {
        Command::Info { file } => info(&file),
        Command::Tabulate {
            file,
            system,
            seats,
            seed,
            verbose,
            out,
        } => tabulate(
            &file,
            TabulateOverrides {
                system,
                seats,
                seed,
                verbose,
            },
            out.as_deref(),
        ),
        Command::Apportion {
            tally,
            seats,
            method,
            seed,
            out,
        } => apportion(&tally, seats, &method, seed, out.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
