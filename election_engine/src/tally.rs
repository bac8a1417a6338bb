//! Tally maps and the small helpers every counting method shares.

use crate::tiebreak::TieBreaker;
use std::collections::BTreeMap;

pub type CandidateId = String;

/// Votes or points per key. Integer vote counts are widened to `f64` so the
/// same map can carry Borda scores or apportionment priorities.
pub type Tally<K = CandidateId> = BTreeMap<K, f64>;

/// Seats per candidate or party.
pub type SeatTally = BTreeMap<CandidateId, u32>;

/// Anything that can be summed as a vote weight.
pub trait Weight: Copy {
    fn weight(self) -> f64;
}

impl Weight for u32 {
    fn weight(self) -> f64 {
        self as f64
    }
}

impl Weight for u64 {
    fn weight(self) -> f64 {
        self as f64
    }
}

impl Weight for usize {
    fn weight(self) -> f64 {
        self as f64
    }
}

impl Weight for f64 {
    fn weight(self) -> f64 {
        self
    }
}

pub fn total<K, V: Weight>(tally: &BTreeMap<K, V>) -> f64 {
    tally.values().map(|v| v.weight()).sum()
}

pub fn total_seats(seats: &SeatTally) -> u32 {
    seats.values().sum()
}

/// Rounds half away from zero to `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Share of the total per key, in percent. Full precision unless `digits` is
/// given. An empty or all-zero tally has no shares.
pub fn percentages<K: Ord + Clone, V: Weight>(
    tally: &BTreeMap<K, V>,
    digits: Option<u32>,
) -> BTreeMap<K, f64> {
    let sum = total(tally);
    if sum == 0.0 {
        return BTreeMap::new();
    }
    tally
        .iter()
        .map(|(k, v)| {
            let pct = v.weight() * 100.0 / sum;
            let pct = match digits {
                Some(d) => round_to(pct, d),
                None => pct,
            };
            (k.clone(), pct)
        })
        .collect()
}

pub fn to_tally<K: Ord + Clone, V: Weight>(counts: &BTreeMap<K, V>) -> Tally<K> {
    counts.iter().map(|(k, v)| (k.clone(), v.weight())).collect()
}

/// Entries by value, highest first; equal values keep key order.
pub fn sorted_desc<K: Ord + Clone>(tally: &Tally<K>) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = tally.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// The `n` highest entries. Everything strictly above the n-th value is
/// taken; the remaining places are drawn from the entries tied at that value.
pub fn select_top<K: Ord + Clone>(tally: &Tally<K>, n: usize, tiebreak: &mut TieBreaker) -> Vec<K> {
    let sorted = sorted_desc(tally);
    if sorted.len() <= n {
        return sorted.into_iter().map(|(k, _)| k).collect();
    }
    if n == 0 {
        return Vec::new();
    }
    let cutoff = sorted[n - 1].1;
    let mut chosen: Vec<K> = sorted
        .iter()
        .filter(|(_, v)| *v > cutoff)
        .map(|(k, _)| k.clone())
        .collect();
    let tied: Vec<K> = sorted
        .iter()
        .filter(|(_, v)| *v == cutoff)
        .map(|(k, _)| k.clone())
        .collect();
    let remaining = n - chosen.len();
    chosen.extend(tiebreak.sample(&tied, remaining));
    chosen
}

/// Key holding the lowest value, drawn among ties.
pub fn select_lowest<K: Ord + Clone>(tally: &Tally<K>, tiebreak: &mut TieBreaker) -> Option<K> {
    let min = tally.values().copied().fold(f64::INFINITY, f64::min);
    let tied: Vec<K> = tally
        .iter()
        .filter(|(_, v)| **v == min)
        .map(|(k, _)| k.clone())
        .collect();
    tiebreak.choose(&tied).cloned()
}

/// Key holding the highest value, drawn among ties.
pub fn select_highest<K: Ord + Clone>(tally: &Tally<K>, tiebreak: &mut TieBreaker) -> Option<K> {
    let max = tally.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<K> = tally
        .iter()
        .filter(|(_, v)| **v == max)
        .map(|(k, _)| k.clone())
        .collect();
    tiebreak.choose(&tied).cloned()
}

pub fn add_seats(into: &mut SeatTally, from: &SeatTally) {
    for (party, seats) in from {
        *into.entry(party.clone()).or_insert(0) += seats;
    }
}
