//! Seat apportionment: party-list proportional methods and the divisor
//! methods used to hand seats to districts.
//!
//! The methods are generic over the key type so the same code allocates seats
//! to parties (`String`) and to sub-districts (`NodeId`).

pub mod highest_averages;
pub mod huntington_hill;
pub mod irv_list;
pub mod largest_remainder;
pub mod mixed;
pub mod reduction;

pub use highest_averages::{fill_highest_averages, gap_divisor, gap_highest_averages, highest_averages};
pub use huntington_hill::huntington_hill;
pub use irv_list::{irv_list_pr, IrvListResult, ListStage};
pub use largest_remainder::largest_remainder;
pub use mixed::{apply_threshold, mixed_member, parallel, MixedMember, Threshold};
pub use reduction::ChamberReduction;

use crate::error::{ElectionError, Result};
use crate::tally::{percentages, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quota {
    /// `votes / seats`
    Hare,
    /// `votes / (seats + 1)`
    Droop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum ApportionMethod {
    LargestRemainder { quota: Quota },
    /// Divisors `1 + divisor * seats`. 1 is D'Hondt, 2 Sainte-Lague,
    /// 0.5 Imperiali and 0 hands every seat to the largest party.
    HighestAverages { divisor: f64 },
    /// Highest averages with the interval `factor * (first / second) / seats`.
    GapHighestAverages { factor: f64 },
    HuntingtonHill,
}

impl ApportionMethod {
    pub const DHONDT: ApportionMethod = ApportionMethod::HighestAverages { divisor: 1.0 };
    pub const SAINTE_LAGUE: ApportionMethod = ApportionMethod::HighestAverages { divisor: 2.0 };
    pub const HARE: ApportionMethod = ApportionMethod::LargestRemainder { quota: Quota::Hare };
    pub const DROOP: ApportionMethod = ApportionMethod::LargestRemainder { quota: Quota::Droop };

    pub fn apportion<K: Ord + Clone>(
        &self,
        votes: &Tally<K>,
        seats: u32,
        tiebreak: &mut TieBreaker,
    ) -> Result<BTreeMap<K, u32>> {
        match *self {
            ApportionMethod::LargestRemainder { quota } => largest_remainder(votes, seats, quota, tiebreak),
            ApportionMethod::HighestAverages { divisor } => highest_averages(votes, seats, divisor, tiebreak),
            ApportionMethod::GapHighestAverages { factor } => gap_highest_averages(votes, seats, factor, tiebreak),
            ApportionMethod::HuntingtonHill => huntington_hill(votes, seats, tiebreak),
        }
    }
}

impl Default for ApportionMethod {
    fn default() -> Self {
        ApportionMethod::DHONDT
    }
}

impl fmt::Display for ApportionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApportionMethod::LargestRemainder { quota: Quota::Hare } => write!(f, "largest remainder (Hare quota)"),
            ApportionMethod::LargestRemainder { quota: Quota::Droop } => write!(f, "largest remainder (Droop quota)"),
            ApportionMethod::HighestAverages { divisor } => write!(f, "highest averages (divisor interval {})", divisor),
            ApportionMethod::GapHighestAverages { factor } => write!(f, "gap-scaled highest averages (factor {})", factor),
            ApportionMethod::HuntingtonHill => write!(f, "Huntington-Hill"),
        }
    }
}

/// Shared input checks: at least one seat and one party.
pub(crate) fn validate<K>(votes: &Tally<K>, seats: u32) -> Result<()> {
    if seats == 0 {
        return Err(ElectionError::InvalidSeatCount(0));
    }
    if votes.is_empty() {
        return Err(ElectionError::NoCandidates);
    }
    Ok(())
}

/// Party-list PR over a vote tally, with the seat table in the trace.
pub fn list_pr(
    votes: &Tally,
    seats: u32,
    method: &ApportionMethod,
    tiebreak: &mut TieBreaker,
    trace: &mut Trace,
) -> Result<SeatTally> {
    let allocation = method.apportion(votes, seats, tiebreak)?;
    trace.heading(format!("A list PR election is conducted for {} seats ({}).", seats, method));
    seat_table(trace, votes, &allocation);
    Ok(allocation)
}

/// Votes and seats side by side, largest list first.
pub(crate) fn seat_table(trace: &mut Trace, votes: &Tally, seats: &SeatTally) {
    if !trace.is_enabled() {
        return;
    }
    let vote_pcts = percentages(votes, None);
    let seat_pcts = percentages(seats, None);
    trace.line(format!("  {:<24} {:>12} {:>8} {:>6} {:>8}", "List", "Votes", "(pct)", "Seats", "(pct)"));
    for (party, count) in crate::tally::sorted_desc(votes) {
        trace.line(format!(
            "  {:<24} {:>12.0} {:>8.2} {:>6} {:>8.2}",
            party,
            count,
            vote_pcts.get(&party).copied().unwrap_or(0.0),
            seats.get(&party).copied().unwrap_or(0),
            seat_pcts.get(&party).copied().unwrap_or(0.0),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn votes(entries: &[(&str, f64)]) -> Tally {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn every_method_fills_every_seat() {
        let methods = [
            ApportionMethod::HARE,
            ApportionMethod::DROOP,
            ApportionMethod::DHONDT,
            ApportionMethod::SAINTE_LAGUE,
            ApportionMethod::HighestAverages { divisor: 0.5 },
            ApportionMethod::HighestAverages { divisor: 0.0 },
            ApportionMethod::GapHighestAverages { factor: 1.0 },
            ApportionMethod::GapHighestAverages { factor: 4.0 },
            ApportionMethod::HuntingtonHill,
        ];
        let tallies = [
            votes(&[("A", 100000.0), ("B", 80000.0), ("C", 30000.0), ("D", 20000.0)]),
            votes(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]),
            votes(&[("A", 517.0), ("B", 3.0), ("C", 299.0), ("D", 1.0), ("E", 88.0)]),
        ];
        for method in methods.iter() {
            for tally in tallies.iter() {
                for seats in 1..=25 {
                    let mut tb = TieBreaker::seeded(u64::from(seats));
                    let result = method.apportion(tally, seats, &mut tb).unwrap();
                    let total: u32 = result.values().sum();
                    assert_eq!(total, seats, "{} with {} seats over {:?}", method, seats, tally);
                    assert_eq!(result.len(), tally.len());
                }
            }
        }
    }

    #[test]
    fn zero_seats_is_invalid() {
        let tally = votes(&[("A", 1.0)]);
        let err = ApportionMethod::DHONDT.apportion(&tally, 0, &mut TieBreaker::seeded(0)).unwrap_err();
        assert!(matches!(err, ElectionError::InvalidSeatCount(0)));
    }

    #[test]
    fn empty_tally_has_no_candidates() {
        let err = ApportionMethod::HuntingtonHill
            .apportion(&Tally::<String>::new(), 3, &mut TieBreaker::seeded(0))
            .unwrap_err();
        assert!(matches!(err, ElectionError::NoCandidates));
    }

    #[test]
    fn methods_deserialize_from_json() {
        let method: ApportionMethod =
            serde_json::from_str(r#"{"method": "highest-averages", "divisor": 2.0}"#).unwrap();
        assert_eq!(method, ApportionMethod::SAINTE_LAGUE);
        let method: ApportionMethod =
            serde_json::from_str(r#"{"method": "largest-remainder", "quota": "droop"}"#).unwrap();
        assert_eq!(method, ApportionMethod::DROOP);
        let method: ApportionMethod =
            serde_json::from_str(r#"{"method": "gap-highest-averages", "factor": 1.5}"#).unwrap();
        assert_eq!(method, ApportionMethod::GapHighestAverages { factor: 1.5 });
    }
}
