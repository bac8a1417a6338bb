//! Party-list PR with instant-runoff style elimination of unrepresented lists.
//!
//! Not used by any real parliament; the single transferable vote is its
//! closest relative. Each stage apportions seats; if a list ends up without a
//! seat, the weakest list is dropped and its ballots move to their next
//! surviving preference before seats are apportioned again.

use super::{seat_table, ApportionMethod};
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::{select_lowest, CandidateId, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListStage {
    pub stage: usize,
    pub votes: Tally,
    pub seats: SeatTally,
    /// List dropped after this stage.
    pub eliminated: Option<CandidateId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrvListResult {
    pub stages: Vec<ListStage>,
    pub seats: SeatTally,
}

pub fn irv_list_pr(
    ledger: &VoteLedger,
    seats: u32,
    method: &ApportionMethod,
    tiebreak: &mut TieBreaker,
    trace: &mut Trace,
) -> Result<IrvListResult> {
    let mut votes = ledger.first_pref_tally();
    if votes.is_empty() {
        return Err(ElectionError::NoCandidates);
    }

    trace.heading(format!(
        "An IRV list PR election is conducted for {} seats ({}).",
        seats, method
    ));

    let mut stages = Vec::new();
    let mut stage = 1;
    loop {
        let allocation = method.apportion(&votes, seats, tiebreak)?;
        trace.line(format!("The votes and the corresponding seats at stage {} are as follows:", stage));
        seat_table(trace, &votes, &allocation);

        if allocation.values().all(|s| *s > 0) {
            trace.outcome(format!("All voters are represented at the final stage ({}).", stage));
            stages.push(ListStage {
                stage,
                votes,
                seats: allocation.clone(),
                eliminated: None,
            });
            return Ok(IrvListResult {
                stages,
                seats: allocation,
            });
        }

        let loser = select_lowest(&votes, tiebreak).ok_or(ElectionError::NoCandidates)?;
        trace.line(format!("{} is eliminated at stage {}.", loser, stage));

        let surviving: BTreeSet<CandidateId> = votes.keys().filter(|p| **p != loser).cloned().collect();
        let (next_votes, _) = ledger.tally_among(&surviving);
        stages.push(ListStage {
            stage,
            votes,
            seats: allocation,
            eliminated: Some(loser),
        });
        votes = next_votes;
        stage += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrepresented_list_transfers() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(60, &["A", "B"]);
        ledger.add_votes(35, &["B", "A"]);
        ledger.add_votes(5, &["C", "B"]);
        let result = irv_list_pr(&ledger, 3, &ApportionMethod::DHONDT, &mut TieBreaker::seeded(0), &mut Trace::quiet()).unwrap();
        assert_eq!(result.stages.len(), 2);
        assert_eq!(result.stages[0].eliminated.as_deref(), Some("C"));
        assert_eq!(result.stages[1].votes["B"], 40.0);
        assert!(!result.seats.contains_key("C"));
        assert_eq!(result.seats.values().sum::<u32>(), 3);
        assert!(result.seats.values().all(|s| *s > 0));
    }

    #[test]
    fn everyone_represented_first_time() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(50, &["A"]);
        ledger.add_votes(50, &["B"]);
        let result = irv_list_pr(&ledger, 4, &ApportionMethod::HARE, &mut TieBreaker::seeded(0), &mut Trace::quiet()).unwrap();
        assert_eq!(result.stages.len(), 1);
        assert_eq!(result.seats["A"], 2);
    }

    #[test]
    fn single_seat_ends_with_one_list() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(40, &["A"]);
        ledger.add_votes(35, &["B", "C"]);
        ledger.add_votes(25, &["C", "B"]);
        let result = irv_list_pr(&ledger, 1, &ApportionMethod::DHONDT, &mut TieBreaker::seeded(0), &mut Trace::quiet()).unwrap();
        assert_eq!(result.seats.len(), 1);
        assert_eq!(result.seats["B"], 1);
    }
}
