//! Mixed systems: district seats combined with party-list seats.

use super::{fill_highest_averages, highest_averages, ApportionMethod};
use crate::error::{ElectionError, Result};
use crate::tally::{add_seats, percentages, sorted_desc, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Electoral threshold for list seats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    /// Minimum share of the list vote, in percent.
    pub percent: f64,
    /// The largest lists that qualify regardless of the threshold.
    #[serde(default = "default_min_parties")]
    pub min_parties: usize,
}

fn default_min_parties() -> usize {
    1
}

/// Lists under the threshold are removed, except the `min_parties` largest.
pub fn apply_threshold(votes: &Tally, threshold: &Threshold) -> Tally {
    let shares = percentages(votes, None);
    let exempt: BTreeSet<String> = sorted_desc(votes)
        .into_iter()
        .take(threshold.min_parties)
        .map(|(party, _)| party)
        .collect();
    votes
        .iter()
        .filter(|(party, _)| {
            exempt.contains(*party) || shares.get(*party).copied().unwrap_or(0.0) >= threshold.percent
        })
        .map(|(party, count)| (party.clone(), *count))
        .collect()
}

/// Parallel voting: list seats are apportioned independently of the district
/// results and the two are simply added.
pub fn parallel(
    district_seats: &SeatTally,
    list_votes: &Tally,
    list_seats: u32,
    method: &ApportionMethod,
    threshold: Option<&Threshold>,
    tiebreak: &mut TieBreaker,
) -> Result<SeatTally> {
    let qualified = match threshold {
        Some(t) => apply_threshold(list_votes, t),
        None => list_votes.clone(),
    };
    let list = method.apportion(&qualified, list_seats, tiebreak)?;
    let mut seats = district_seats.clone();
    add_seats(&mut seats, &list);
    Ok(seats)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedMember {
    /// Size of the chamber, district seats included.
    pub total_seats: u32,
    /// Divisor interval of the compensatory count.
    #[serde(default = "default_divisor")]
    pub divisor: f64,
    /// Apportion all seats by list vote and let parties keep any district
    /// seats above that (overhang), instead of compensating.
    #[serde(default)]
    pub overhang: bool,
    #[serde(default)]
    pub threshold: Option<Threshold>,
}

fn default_divisor() -> f64 {
    1.0
}

/// Mixed-member proportional allocation.
///
/// Without overhang the divisor count starts from the district seats, so list
/// seats compensate parties that won few districts; the chamber holds
/// `total_seats` unless the districts alone exceed it. With overhang the list
/// vote decides the full chamber and a party keeps its district seats if they
/// are more than its proportional share, which can grow the chamber.
pub fn mixed_member(
    district_seats: &SeatTally,
    list_votes: &Tally,
    config: &MixedMember,
    tiebreak: &mut TieBreaker,
) -> Result<SeatTally> {
    if config.total_seats == 0 {
        return Err(ElectionError::InvalidSeatCount(0));
    }
    let qualified = match &config.threshold {
        Some(t) => apply_threshold(list_votes, t),
        None => list_votes.clone(),
    };
    if qualified.is_empty() {
        return Err(ElectionError::NoCandidates);
    }

    if config.overhang {
        let mut seats = highest_averages(&qualified, config.total_seats, config.divisor, tiebreak)?;
        for (party, won) in district_seats {
            let held = seats.entry(party.clone()).or_insert(0);
            *held = (*held).max(*won);
        }
        return Ok(seats);
    }

    let mut seats = district_seats.clone();
    for party in qualified.keys() {
        seats.entry(party.clone()).or_insert(0);
    }
    fill_highest_averages(&qualified, &mut seats, config.total_seats, config.divisor, tiebreak)?;
    Ok(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apportion::tests::votes;

    fn seats(entries: &[(&str, u32)]) -> SeatTally {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn threshold_drops_small_lists() {
        let tally = votes(&[("A", 60.0), ("B", 36.0), ("C", 4.0)]);
        let kept = apply_threshold(&tally, &Threshold { percent: 5.0, min_parties: 1 });
        assert!(kept.contains_key("A"));
        assert!(kept.contains_key("B"));
        assert!(!kept.contains_key("C"));

        let kept = apply_threshold(&tally, &Threshold { percent: 70.0, min_parties: 2 });
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn parallel_adds_both_tiers() {
        let districts = seats(&[("A", 6), ("B", 4)]);
        let list = votes(&[("A", 40.0), ("B", 36.0), ("C", 24.0)]);
        let result = parallel(&districts, &list, 10, &ApportionMethod::HARE, None, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(result.values().sum::<u32>(), 20);
        assert_eq!(result["A"], 10);
        assert_eq!(result["C"], 2);
    }

    #[test]
    fn compensation_reaches_chamber_size() {
        let districts = seats(&[("A", 8), ("B", 2)]);
        let list = votes(&[("A", 40.0), ("B", 40.0), ("C", 20.0)]);
        let config = MixedMember {
            total_seats: 20,
            divisor: 1.0,
            overhang: false,
            threshold: None,
        };
        let result = mixed_member(&districts, &list, &config, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(result.values().sum::<u32>(), 20);
        assert_eq!(result["A"], 8);
        assert_eq!(result["B"], 8);
        assert_eq!(result["C"], 4);
    }

    #[test]
    fn overhang_keeps_district_seats() {
        let districts = seats(&[("A", 9), ("B", 1)]);
        let list = votes(&[("A", 30.0), ("B", 50.0), ("C", 20.0)]);
        let config = MixedMember {
            total_seats: 10,
            divisor: 1.0,
            overhang: true,
            threshold: None,
        };
        let result = mixed_member(&districts, &list, &config, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(result["A"], 9);
        assert!(result["B"] >= 1);
        assert!(result.values().sum::<u32>() > 10);
        for (party, won) in &districts {
            assert!(result[party] >= *won);
        }
    }
}
