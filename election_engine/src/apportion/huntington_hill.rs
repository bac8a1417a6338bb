use super::validate;
use crate::error::{ElectionError, Result};
use crate::tally::{select_highest, select_top, Tally};
use crate::tiebreak::TieBreaker;
use std::collections::BTreeMap;

/// Huntington-Hill (equal proportions), as used for the U.S. House.
///
/// Every party starts from one seat; further seats go to the highest priority
/// `votes / sqrt(n * (n + 1))`. With fewer seats than parties the floor seats
/// go to the largest parties.
pub fn huntington_hill<K: Ord + Clone>(
    votes: &Tally<K>,
    seats: u32,
    tiebreak: &mut TieBreaker,
) -> Result<BTreeMap<K, u32>> {
    validate(votes, seats)?;
    let mut allocation: BTreeMap<K, u32> = votes.keys().map(|party| (party.clone(), 0)).collect();

    if (seats as usize) <= votes.len() {
        for party in select_top(votes, seats as usize, tiebreak) {
            allocation.insert(party, 1);
        }
        return Ok(allocation);
    }

    for held in allocation.values_mut() {
        *held = 1;
    }
    let mut filled = votes.len() as u32;
    while filled < seats {
        let priorities: Tally<K> = votes
            .iter()
            .map(|(party, count)| {
                let n = f64::from(allocation.get(party).copied().unwrap_or(1));
                (party.clone(), count / (n * (n + 1.0)).sqrt())
            })
            .collect();
        let pick = select_highest(&priorities, tiebreak).ok_or(ElectionError::NoCandidates)?;
        *allocation.entry(pick).or_insert(0) += 1;
        filled += 1;
    }
    Ok(allocation)
}
