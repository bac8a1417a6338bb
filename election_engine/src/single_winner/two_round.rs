use super::{plurality, Outcome};
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::{percentages, select_top, sorted_desc, CandidateId, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use std::collections::BTreeSet;

/// Two-round (contingency) count.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoRoundResult {
    pub first_round: Tally,
    /// Empty when the first round produced a majority.
    pub finalists: Vec<CandidateId>,
    /// `None` when the first round produced a majority.
    pub second_round: Option<Tally>,
    pub outcome: Outcome,
}

/// A first-round majority (more than 50%) wins outright. Otherwise the top
/// `finalists` candidates advance, ties at the cutoff drawn at random, and every
/// ballot counts for its highest-ranked finalist.
pub fn two_round(
    ledger: &VoteLedger,
    finalists: usize,
    tiebreak: &mut TieBreaker,
    trace: &mut Trace,
) -> Result<TwoRoundResult> {
    if finalists == 0 {
        return Err(ElectionError::InvalidFinalists(0));
    }
    let first_round = ledger.first_pref_tally();
    let leader = match sorted_desc(&first_round).into_iter().next() {
        Some((name, _)) => name,
        None => return Err(ElectionError::NoCandidates),
    };

    trace.heading("Two-Round System");
    trace.line("The first round results are as follows:");
    trace.tally(&first_round);

    let shares = percentages(&first_round, None);
    if shares.get(&leader).copied().unwrap_or(0.0) > 50.0 {
        let outcome = plurality(&first_round, tiebreak)?;
        trace.outcome(format!(
            "{} has obtained a majority in the first round, and is elected outright with a margin of {} votes.",
            outcome.winner, outcome.margin
        ));
        return Ok(TwoRoundResult {
            first_round,
            finalists: Vec::new(),
            second_round: None,
            outcome,
        });
    }

    let advancing = select_top(&first_round, finalists, tiebreak);
    trace.line(format!("{} advance to the second round.", advancing.join(", ")));

    let active: BTreeSet<CandidateId> = advancing.iter().cloned().collect();
    let (second_round, exhausted) = ledger.tally_among(&active);
    trace.line("The second round results are as follows:");
    trace.tally(&second_round);
    if exhausted > 0 {
        trace.line(format!("{} ballots ranked none of the finalists.", exhausted));
    }

    let outcome = plurality(&second_round, tiebreak)?;
    trace.outcome(format!(
        "{} is elected by a margin of {} votes.",
        outcome.winner, outcome.margin
    ));

    Ok(TwoRoundResult {
        first_round,
        finalists: advancing,
        second_round: Some(second_round),
        outcome,
    })
}
