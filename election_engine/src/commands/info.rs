use colored::Colorize;
use election_engine::config::ElectionFile;
use election_engine::error::Result;
use election_engine::tally::sorted_desc;
use election_engine::tiebreak::TieBreaker;
use std::path::Path;

pub fn info(path: &Path) -> Result<()> {
    let file = ElectionFile::load(path)?;
    println!("🗳️  {}", file.name.bright_cyan().bold());
    if let Some(date) = &file.date {
        println!("📅 {}", date);
    }
    println!("⚙️  System: {}", file.system.to_string().bright_yellow());

    // Build the district tree so nested ballots are aggregated to the root
    let tree = file.build_tree(&mut TieBreaker::from_seed(file.options.tie_break_seed))?;
    let root = tree.node(tree.root())?;
    println!(
        "📋 {} ballots in {} districts",
        root.total_votes().to_string().bright_yellow(),
        root.children().len().to_string().bright_yellow()
    );
    // One line per top-level district
    for child in root.children() {
        let node = tree.node(*child)?;
        println!("   {} {:>10} ballots", format!("{:<20}", node.name()).cyan(), node.total_votes());
    }

    // First preferences, with positions where the file gives them
    let shares = root.ledger().percentages(Some(2));
    println!("👥 First preferences:");
    for (candidate, votes) in sorted_desc(&root.ledger().first_pref_tally()) {
        let position = match tree.positions().get(&candidate) {
            Some(p) => format!("({:+.2}, {:+.2})", p.economic, p.social),
            None => String::new(),
        };
        println!(
            "   {:<20} {:>10} {:>7.2}% {}",
            candidate,
            votes,
            shares.get(&candidate).copied().unwrap_or(0.0),
            position.dimmed()
        );
    }
    println!("✅ {} is valid", path.display());
    Ok(())
}
