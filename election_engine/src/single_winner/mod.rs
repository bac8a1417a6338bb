//! Single-winner electoral systems.
//!
//! Every method reports its result as an [`Outcome`]; all but sortition end
//! in a plurality count over some tally.

pub mod borda;
pub mod instant_runoff;
pub mod ranked_pairs;
pub mod sortition;
pub mod two_round;

pub use borda::{borda, BordaScoring};
pub use instant_runoff::{instant_runoff, RunoffResult, RunoffRound};
pub use ranked_pairs::{ranked_pairs, RankedPairsResult};
pub use sortition::sortition;
pub use two_round::{two_round, TwoRoundResult};

use crate::error::{ElectionError, Result};
use crate::tally::{sorted_desc, CandidateId, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};

/// Winner of a single-winner count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: CandidateId,
    /// Votes (or points) of the winner in the deciding count.
    pub tally: f64,
    /// Lead over the runner-up entry; zero when the top is shared.
    pub margin: f64,
    /// False when the winner was drawn among tied leaders.
    pub unique: bool,
}

impl Outcome {
    /// The winner holding the single seat.
    pub fn seats(&self) -> SeatTally {
        let mut seats = SeatTally::new();
        seats.insert(self.winner.clone(), 1);
        seats
    }
}

/// Highest entry of `tally` wins. Tied leaders are sorted by id and one is
/// drawn from `tiebreak`.
pub fn plurality(tally: &Tally, tiebreak: &mut TieBreaker) -> Result<Outcome> {
    let sorted = sorted_desc(tally);
    let top = match sorted.first() {
        Some((_, votes)) => *votes,
        None => return Err(ElectionError::NoCandidates),
    };

    let leaders: Vec<&CandidateId> = sorted
        .iter()
        .take_while(|(_, votes)| *votes >= top)
        .map(|(name, _)| name)
        .collect();
    let winner = match tiebreak.choose(&leaders) {
        Some(winner) => (*winner).clone(),
        None => return Err(ElectionError::NoCandidates),
    };

    let runner_up = sorted.get(1).map(|(_, votes)| *votes).unwrap_or(0.0);
    Ok(Outcome {
        winner,
        tally: top,
        margin: top - runner_up,
        unique: leaders.len() == 1,
    })
}

/// Plurality with a trace of the count.
pub fn first_past_the_post(tally: &Tally, tiebreak: &mut TieBreaker, trace: &mut Trace) -> Result<Outcome> {
    trace.heading("First Past The Post");
    trace.line("The votes were cast as follows:");
    trace.tally(tally);
    let outcome = plurality(tally, tiebreak)?;
    if !outcome.unique {
        trace.line("Because of a tie, the winner has been chosen randomly.");
    }
    trace.outcome(format!(
        "{} is elected by a margin of {} votes.",
        outcome.winner, outcome.margin
    ));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(&str, f64)]) -> Tally {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn clear_winner() {
        let t = tally(&[("A", 10.0), ("B", 7.0), ("C", 2.0)]);
        let outcome = plurality(&t, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(outcome.winner, "A");
        assert_eq!(outcome.tally, 10.0);
        assert_eq!(outcome.margin, 3.0);
        assert!(outcome.unique);
    }

    #[test]
    fn tie_is_flagged_and_drawn_from_leaders() {
        let t = tally(&[("A", 5.0), ("B", 5.0), ("C", 1.0)]);
        for seed in 0..20 {
            let outcome = plurality(&t, &mut TieBreaker::seeded(seed)).unwrap();
            assert!(outcome.winner == "A" || outcome.winner == "B");
            assert!(!outcome.unique);
            assert_eq!(outcome.margin, 0.0);
        }
        let lex = plurality(&t, &mut TieBreaker::lexicographic()).unwrap();
        assert_eq!(lex.winner, "A");
    }

    #[test]
    fn lone_candidate_margin_is_own_tally() {
        let t = tally(&[("A", 4.0)]);
        let outcome = plurality(&t, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(outcome.margin, 4.0);
        assert!(outcome.unique);
    }

    #[test]
    fn empty_tally_has_no_candidates() {
        let err = plurality(&Tally::new(), &mut TieBreaker::seeded(0)).unwrap_err();
        assert!(matches!(err, ElectionError::NoCandidates));
    }

    #[test]
    fn trace_does_not_change_result() {
        let t = tally(&[("A", 2.0), ("B", 2.0)]);
        let quiet = first_past_the_post(&t, &mut TieBreaker::seeded(5), &mut Trace::quiet()).unwrap();
        let mut trace = Trace::new(true);
        let loud = first_past_the_post(&t, &mut TieBreaker::seeded(5), &mut trace).unwrap();
        assert_eq!(quiet, loud);
        assert!(!trace.lines().is_empty());
    }
}
