use super::{validate, Quota};
use crate::error::{ElectionError, Result};
use crate::tally::{self, select_lowest, select_top, Tally};
use crate::tiebreak::TieBreaker;
use std::collections::BTreeMap;

/// Largest remainder method. Each party first receives `floor(votes / quota)`
/// seats; the seats left over go to the largest fractional remainders, ties
/// at the cutoff drawn from `tiebreak`.
///
/// With the exact Droop quota the whole-number seats can overshoot the total
/// by one when votes are exact quota multiples; the surplus is then taken back
/// from the parties with the smallest remainders.
pub fn largest_remainder<K: Ord + Clone>(
    votes: &Tally<K>,
    seats: u32,
    quota: Quota,
    tiebreak: &mut TieBreaker,
) -> Result<BTreeMap<K, u32>> {
    validate(votes, seats)?;
    let total = tally::total(votes);
    if total <= 0.0 {
        return Err(ElectionError::NoVotes);
    }
    let quota = match quota {
        Quota::Hare => total / f64::from(seats),
        Quota::Droop => total / (f64::from(seats) + 1.0),
    };

    let mut allocation = BTreeMap::new();
    let mut remainders = Tally::new();
    for (party, count) in votes {
        let credit = count / quota;
        let whole = credit.floor();
        allocation.insert(party.clone(), whole as u32);
        remainders.insert(party.clone(), credit - whole);
    }

    let guaranteed: u32 = allocation.values().sum();
    if guaranteed <= seats {
        let leftover = (seats - guaranteed) as usize;
        for party in select_top(&remainders, leftover, tiebreak) {
            if let Some(s) = allocation.get_mut(&party) {
                *s += 1;
            }
        }
    } else {
        for _ in 0..(guaranteed - seats) {
            let holders: Tally<K> = remainders
                .iter()
                .filter(|(party, _)| allocation.get(*party).map_or(false, |s| *s > 0))
                .map(|(party, r)| (party.clone(), *r))
                .collect();
            let party = select_lowest(&holders, tiebreak).ok_or(ElectionError::NoCandidates)?;
            if let Some(s) = allocation.get_mut(&party) {
                *s -= 1;
            }
            // A party loses at most one seat to the correction.
            remainders.remove(&party);
        }
    }
    Ok(allocation)
}
