use super::{plurality, Outcome};
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::Tally;
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BordaScoring {
    /// `longest ballot - 1 - rank` points per ballot.
    Classic,
    /// `1 / (rank + 1)` points per ballot, as used in Nauru.
    Dowdall,
}

impl Default for BordaScoring {
    fn default() -> Self {
        BordaScoring::Classic
    }
}

/// Borda points per candidate. Ranks are zero-based; classic scoring counts
/// down from the longest ballot in the whole ledger.
pub fn borda_scores(ledger: &VoteLedger, scoring: BordaScoring) -> Tally {
    let top = ledger.longest_ballot().saturating_sub(1);
    let mut scores = Tally::new();
    for (ranking, count) in ledger.vote_totals() {
        let count = *count as f64;
        for (rank, candidate) in ranking.iter().enumerate() {
            let points = match scoring {
                BordaScoring::Classic => count * (top - rank) as f64,
                BordaScoring::Dowdall => count / (rank as f64 + 1.0),
            };
            *scores.entry(candidate.clone()).or_insert(0.0) += points;
        }
    }
    scores
}

/// Borda count winner together with the full point table.
pub fn borda(
    ledger: &VoteLedger,
    scoring: BordaScoring,
    tiebreak: &mut TieBreaker,
    trace: &mut Trace,
) -> Result<(Outcome, Tally)> {
    if ledger.is_empty() {
        return Err(ElectionError::NoCandidates);
    }
    let scores = borda_scores(ledger, scoring);

    trace.heading(match scoring {
        BordaScoring::Classic => "Borda Count",
        BordaScoring::Dowdall => "Borda Count (Dowdall)",
    });
    trace.line("Based on the votes, the Borda points are as follows:");
    trace.tally(&scores);

    let outcome = plurality(&scores, tiebreak)?;
    trace.outcome(format!(
        "{} is elected by a margin of {:.4} points.",
        outcome.winner, outcome.margin
    ));
    Ok((outcome, scores))
}
