use super::{seat_table, ApportionMethod};
use crate::error::{ElectionError, Result};
use crate::tally::{total_seats, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};

/// Indirect election of a small chamber: the elected chamber elects one
/// `ratio` times smaller, each member voting for their own party, until at
/// most `final_seats` remain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamberReduction {
    pub final_seats: u32,
    pub ratio: u32,
    #[serde(default)]
    pub method: ApportionMethod,
}

impl ChamberReduction {
    /// Every intermediate chamber, the last one being the final chamber.
    /// Empty when `chamber` is already small enough.
    pub fn reduce(
        &self,
        chamber: &SeatTally,
        tiebreak: &mut TieBreaker,
        trace: &mut Trace,
    ) -> Result<Vec<SeatTally>> {
        if self.final_seats == 0 {
            return Err(ElectionError::InvalidSeatCount(0));
        }
        if self.ratio < 2 {
            return Err(ElectionError::InvalidDivisor(f64::from(self.ratio)));
        }

        let mut stages = Vec::new();
        let mut current = chamber.clone();
        let mut size = total_seats(&current);
        while size > self.final_seats {
            let next = (size / self.ratio).max(self.final_seats);
            // Parties that lost every seat have no one left to vote for them.
            let votes: Tally = current
                .iter()
                .filter(|(_, held)| **held > 0)
                .map(|(party, held)| (party.clone(), f64::from(*held)))
                .collect();
            let elected = self.method.apportion(&votes, next, tiebreak)?;
            trace.heading(format!(
                "The chamber of {} elects a chamber of {} ({}).",
                size, next, self.method
            ));
            seat_table(trace, &votes, &elected);
            stages.push(elected.clone());
            current = elected;
            size = next;
        }
        Ok(stages)
    }
}
