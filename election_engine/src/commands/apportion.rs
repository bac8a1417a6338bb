use colored::Colorize;
use election_engine::apportion::ApportionMethod;
use election_engine::error::Result;
use election_engine::tally::{percentages, sorted_desc, Tally};
use election_engine::tiebreak::TieBreaker;
use election_engine::util::{read_serialized, write_serialized};
use std::path::Path;

pub fn apportion(
    tally_path: &Path,
    seats: u32,
    method: &ApportionMethod,
    seed: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    // Read the party -> votes map
    let votes: Tally = read_serialized(tally_path)?;
    println!(
        "🧮 Apportioning {} seats among {} parties by {}",
        seats.to_string().bright_yellow(),
        votes.len().to_string().bright_yellow(),
        method.to_string().bright_cyan()
    );

    // Seeded so repeated runs break ties the same way
    let allocation = method.apportion(&votes, seats, &mut TieBreaker::from_seed(seed))?;
    let vote_pcts = percentages(&votes, Some(2));
    for (party, count) in sorted_desc(&votes) {
        let won = allocation.get(&party).copied().unwrap_or(0);
        println!(
            "   {:<24} {:>12.0} {:>7.2}%  {}",
            party,
            count,
            vote_pcts.get(&party).copied().unwrap_or(0.0),
            won.to_string().bright_green().bold()
        );
    }

    // Optionally save the seat table
    if let Some(out) = out {
        write_serialized(out, &allocation)?;
        println!("✅ Seats written to {}", out.display().to_string().bright_green());
    }
    Ok(())
}
