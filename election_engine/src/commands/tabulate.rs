use colored::Colorize;
use election_engine::config::ElectionFile;
use election_engine::error::Result;
use election_engine::report::ElectionReport;
use election_engine::system::ElectoralSystem;
use election_engine::util::{file_digest, write_serialized};
use std::path::Path;

/// Command-line settings that take precedence over the election file.
#[derive(Debug, Default)]
pub struct TabulateOverrides {
    pub system: Option<ElectoralSystem>,
    pub seats: Option<u32>,
    pub seed: Option<u64>,
    pub verbose: bool,
}

pub fn tabulate(path: &Path, overrides: TabulateOverrides, out: Option<&Path>) -> Result<()> {
    // Load the file, then apply command-line overrides
    let mut file = ElectionFile::load(path)?;
    if let Some(system) = overrides.system {
        file.system = system;
    }
    if let Some(seats) = overrides.seats {
        file.seats = seats;
        file.validate()?;
    }
    // Flags win over the file's own options
    let mut options = file.options.clone();
    options.verbose |= overrides.verbose;
    if overrides.seed.is_some() {
        options.tie_break_seed = overrides.seed;
    }

    println!(
        "🚀 Tabulating {} under {}",
        file.name.bright_cyan(),
        file.system.to_string().bright_cyan()
    );
    // The digest ties the report to the exact input bytes
    let report = ElectionReport::generate(&file, &options, Some(file_digest(path)?))?;

    println!(
        "📊 {} ballots, {} seats",
        report.ballot_count.to_string().bright_yellow(),
        report.total_seats.to_string().bright_yellow()
    );
    // Seat winners are highlighted
    for candidate in &report.candidates {
        let seats = if candidate.seats > 0 {
            candidate.seats.to_string().bright_green().bold()
        } else {
            candidate.seats.to_string().normal()
        };
        println!(
            "   {:<24} {:>10} {:>7.2}%  seats {:>4} {:>7.2}%",
            candidate.name, candidate.votes, candidate.vote_percent, seats, candidate.seat_percent
        );
    }
    if let Some(outcome) = &report.outcome {
        let note = if outcome.unique { "" } else { " (drawn from a tie)" };
        println!(
            "🏆 {} wins by {} votes{}",
            outcome.winner.bright_green().bold(),
            outcome.margin,
            note
        );
    }
    if let Some(coalition) = &report.coalition {
        println!(
            "🤝 Most likely coalition: {} ({} seats)",
            coalition.parties.join(" + ").bright_green(),
            coalition.seats
        );
    }

    // Write report JSON, gzip-compressed for .gz paths
    if let Some(out) = out {
        write_serialized(out, &report)?;
        println!("✅ Report written to {}", out.display().to_string().bright_green());
    }
    Ok(())
}
