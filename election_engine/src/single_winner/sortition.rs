use super::Outcome;
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use rand::Rng;

/// Random ballot. One voter is drawn by lot and their first choice takes the
/// seat, so each candidate wins with probability equal to their
/// first-preference share. The draw always comes from the generator, whatever
/// the tie policy.
pub fn sortition(ledger: &VoteLedger, tiebreak: &mut TieBreaker, trace: &mut Trace) -> Result<Outcome> {
    let first_prefs = ledger.first_prefs();
    let total: u64 = first_prefs.values().sum();
    if total == 0 {
        return Err(ElectionError::NoCandidates);
    }

    trace.heading("Sortition");
    let mut lot = tiebreak.rng().gen_range(0..total);
    let mut drawn = None;
    for (candidate, count) in first_prefs {
        if lot < *count {
            drawn = Some((candidate.clone(), *count));
            break;
        }
        lot -= count;
    }
    let (winner, votes) = drawn.ok_or(ElectionError::NoCandidates)?;

    trace.outcome(format!(
        "{} is chosen by lot, holding {} of {} first preferences.",
        winner, votes, total
    ));
    Ok(Outcome {
        winner,
        tally: votes as f64,
        margin: 0.0,
        unique: true,
    })
}
