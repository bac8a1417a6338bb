use super::{plurality, Outcome};
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::{self, select_lowest, CandidateId, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One count of an elimination contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunoffRound {
    pub round: usize,
    pub tally: Tally,
    /// Candidate dropped after this count; `None` in the deciding count.
    pub eliminated: Option<CandidateId>,
    /// Ballots that rank no remaining candidate.
    pub exhausted: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunoffResult {
    pub rounds: Vec<RunoffRound>,
    pub outcome: Outcome,
}

/// Instant-runoff voting. Candidates start from the first-preference count;
/// the lowest is eliminated (drawn among ties) until someone holds more than
/// half of the ballots still in play.
pub fn instant_runoff(ledger: &VoteLedger, tiebreak: &mut TieBreaker, trace: &mut Trace) -> Result<RunoffResult> {
    let mut active: BTreeSet<CandidateId> = ledger.first_prefs().keys().cloned().collect();
    if active.is_empty() {
        return Err(ElectionError::NoCandidates);
    }

    trace.heading("Instant Runoff Voting");
    let mut rounds = Vec::new();
    let mut round = 1;

    loop {
        let (counts, exhausted) = ledger.tally_among(&active);
        let total = tally::total(&counts);
        let leading = counts.values().copied().fold(0.0, f64::max);

        trace.line(format!("The vote totals at count {} are as follows:", round));
        trace.tally(&counts);

        let majority = total > 0.0 && leading * 100.0 / total > 50.0;
        if majority || active.len() == 1 {
            let outcome = plurality(&counts, tiebreak)?;
            trace.outcome(format!("{} has been elected at count {}.", outcome.winner, round));
            rounds.push(RunoffRound {
                round,
                tally: counts,
                eliminated: None,
                exhausted,
            });
            return Ok(RunoffResult { rounds, outcome });
        }

        let loser = select_lowest(&counts, tiebreak).ok_or(ElectionError::NoCandidates)?;
        trace.line(format!("{} is eliminated at count {}.", loser, round));
        active.remove(&loser);
        rounds.push(RunoffRound {
            round,
            tally: counts,
            eliminated: Some(loser),
            exhausted,
        });
        round += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfers_elect_second_place() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(40, &["A", "C"]);
        ledger.add_votes(35, &["B", "C"]);
        ledger.add_votes(25, &["C", "B"]);
        let result = instant_runoff(&ledger, &mut TieBreaker::seeded(3), &mut Trace::quiet()).unwrap();
        assert_eq!(result.outcome.winner, "B");
        assert_eq!(result.outcome.tally, 60.0);
        assert_eq!(result.rounds.len(), 2);
        assert_eq!(result.rounds[0].eliminated.as_deref(), Some("C"));
        assert_eq!(result.rounds[1].eliminated, None);
    }

    #[test]
    fn first_round_majority() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(51, &["A"]);
        ledger.add_votes(49, &["B"]);
        let result = instant_runoff(&ledger, &mut TieBreaker::seeded(3), &mut Trace::quiet()).unwrap();
        assert_eq!(result.outcome.winner, "A");
        assert_eq!(result.rounds.len(), 1);
    }

    #[test]
    fn exhausted_ballots_leave_the_count() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(4, &["A"]);
        ledger.add_votes(3, &["B"]);
        ledger.add_votes(2, &["C"]);
        ledger.add_votes(1, &["D", "B"]);
        let result = instant_runoff(&ledger, &mut TieBreaker::seeded(3), &mut Trace::quiet()).unwrap();
        // D goes to B (4 vs 4 vs 2), C exhausts, then A and B are level on 4
        // and one of them is drawn out.
        assert_eq!(result.rounds.len(), 4);
        assert_eq!(result.rounds[2].exhausted, 2);
        assert_eq!(result.rounds[2].tally.len(), 2);
        assert!(result.outcome.winner == "A" || result.outcome.winner == "B");
    }

    #[test]
    fn seeded_elimination_is_repeatable() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(10, &["A", "B"]);
        ledger.add_votes(10, &["B", "C"]);
        ledger.add_votes(10, &["C", "A"]);
        let first = instant_runoff(&ledger, &mut TieBreaker::seeded(42), &mut Trace::quiet()).unwrap();
        let second = instant_runoff(&ledger, &mut TieBreaker::seeded(42), &mut Trace::quiet()).unwrap();
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.rounds, second.rounds);
    }

    #[test]
    fn lexicographic_policy_eliminates_first_id() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(10, &["A", "B"]);
        ledger.add_votes(10, &["B", "C"]);
        ledger.add_votes(10, &["C", "A"]);
        let result = instant_runoff(&ledger, &mut TieBreaker::lexicographic(), &mut Trace::quiet()).unwrap();
        assert_eq!(result.rounds[0].eliminated.as_deref(), Some("A"));
        // A's ballots move to B, which then holds 20 of 30.
        assert_eq!(result.outcome.winner, "B");
    }
}
