use super::validate;
use crate::error::{ElectionError, Result};
use crate::tally::{select_highest, Tally};
use crate::tiebreak::TieBreaker;
use std::collections::BTreeMap;

/// Highest averages with divisors `1 + divisor * seats_held`.
pub fn highest_averages<K: Ord + Clone>(
    votes: &Tally<K>,
    seats: u32,
    divisor: f64,
    tiebreak: &mut TieBreaker,
) -> Result<BTreeMap<K, u32>> {
    validate(votes, seats)?;
    let mut allocation: BTreeMap<K, u32> = votes.keys().map(|party| (party.clone(), 0)).collect();
    fill_highest_averages(votes, &mut allocation, seats, divisor, tiebreak)?;
    Ok(allocation)
}

/// Divisor interval `factor * (first / second) / seats`, where `first` and
/// `second` are the two largest vote totals. With no second list holding
/// votes the gap counts as 1.
pub fn gap_divisor<K>(votes: &Tally<K>, seats: u32, factor: f64) -> Result<f64> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(ElectionError::InvalidDivisor(factor));
    }
    let mut totals: Vec<f64> = votes.values().copied().collect();
    totals.sort_by(|a, b| b.total_cmp(a));
    let gap = match (totals.first(), totals.get(1)) {
        (Some(first), Some(second)) if *second > 0.0 => first / second,
        _ => 1.0,
    };
    Ok(factor * gap / f64::from(seats))
}

/// Highest averages whose divisor interval grows with the lead of the
/// largest list over the runner-up. See [`gap_divisor`].
pub fn gap_highest_averages<K: Ord + Clone>(
    votes: &Tally<K>,
    seats: u32,
    factor: f64,
    tiebreak: &mut TieBreaker,
) -> Result<BTreeMap<K, u32>> {
    validate(votes, seats)?;
    let divisor = gap_divisor(votes, seats, factor)?;
    highest_averages(votes, seats, divisor, tiebreak)
}

/// Continues a divisor count from an existing allocation until it holds
/// `until` seats in total. Seats already held (district seats under MMP, for
/// instance) count towards each party's divisor.
pub fn fill_highest_averages<K: Ord + Clone>(
    votes: &Tally<K>,
    allocation: &mut BTreeMap<K, u32>,
    until: u32,
    divisor: f64,
    tiebreak: &mut TieBreaker,
) -> Result<()> {
    if !(divisor >= 0.0) || !divisor.is_finite() {
        return Err(ElectionError::InvalidDivisor(divisor));
    }
    let mut filled: u32 = allocation.values().sum();
    while filled < until {
        let averages: Tally<K> = votes
            .iter()
            .map(|(party, count)| {
                let held = allocation.get(party).copied().unwrap_or(0);
                (party.clone(), count / (1.0 + divisor * f64::from(held)))
            })
            .collect();
        let pick = select_highest(&averages, tiebreak).ok_or(ElectionError::NoCandidates)?;
        *allocation.entry(pick).or_insert(0) += 1;
        filled += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apportion::tests::votes;

    fn classic() -> Tally {
        votes(&[("A", 100000.0), ("B", 80000.0), ("C", 30000.0), ("D", 20000.0)])
    }

    #[test]
    fn dhondt_hand_example() {
        // Quotients: 100k 80k 50k 40k 33.3k 30k 26.7k | 25k 20k ...
        let seats = highest_averages(&classic(), 7, 1.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 3);
        assert_eq!(seats["B"], 3);
        assert_eq!(seats["C"], 1);
        assert_eq!(seats["D"], 0);

        let seats = highest_averages(&classic(), 8, 1.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 4);
        assert_eq!(seats["B"], 3);
        assert_eq!(seats["C"], 1);
        assert_eq!(seats["D"], 0);
    }

    #[test]
    fn sainte_lague_hand_example() {
        // Quotients: 100k 80k 33.3k 30k 26.7k 20k 20k | 16k ...
        let seats = highest_averages(&classic(), 7, 2.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 3);
        assert_eq!(seats["B"], 2);
        assert_eq!(seats["C"], 1);
        assert_eq!(seats["D"], 1);

        let seats = highest_averages(&classic(), 8, 2.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 3);
        assert_eq!(seats["B"], 3);
    }

    #[test]
    fn zero_divisor_is_winner_take_all() {
        let seats = highest_averages(&classic(), 5, 0.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 5);
        assert_eq!(seats["D"], 0);
    }

    #[test]
    fn imperiali_favours_large_parties() {
        let dhondt = highest_averages(&classic(), 10, 1.0, &mut TieBreaker::seeded(0)).unwrap();
        let imperiali = highest_averages(&classic(), 10, 0.5, &mut TieBreaker::seeded(0)).unwrap();
        assert!(imperiali["A"] >= dhondt["A"]);
        assert!(imperiali["D"] <= dhondt["D"]);
    }

    #[test]
    fn negative_divisor_rejected() {
        let err = highest_averages(&classic(), 5, -1.0, &mut TieBreaker::seeded(0)).unwrap_err();
        assert!(matches!(err, ElectionError::InvalidDivisor(_)));
    }

    #[test]
    fn gap_divisor_scales_with_the_lead() {
        let tally = votes(&[("A", 60.0), ("B", 30.0), ("C", 10.0)]);
        let divisor = gap_divisor(&tally, 6, 1.0).unwrap();
        assert!((divisor - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(gap_divisor(&tally, 6, 3.0).unwrap(), 1.0);

        // Averages with interval 1/3: A 60 45 36 30 25.7, B 30 22.5, C 10.
        let seats = gap_highest_averages(&tally, 6, 1.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 5);
        assert_eq!(seats["B"], 1);
        assert_eq!(seats["C"], 0);
    }

    #[test]
    fn gap_with_a_single_voted_list() {
        let tally = votes(&[("A", 40.0), ("B", 0.0)]);
        assert_eq!(gap_divisor(&tally, 4, 2.0).unwrap(), 0.5);
        let seats = gap_highest_averages(&tally, 4, 2.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(seats["A"], 4);
        assert_eq!(seats["B"], 0);
    }

    #[test]
    fn gap_rejects_bad_factor_and_zero_seats() {
        let tally = votes(&[("A", 60.0), ("B", 30.0)]);
        let err = gap_highest_averages(&tally, 4, -1.0, &mut TieBreaker::seeded(0)).unwrap_err();
        assert!(matches!(err, ElectionError::InvalidDivisor(_)));
        let err = gap_highest_averages(&tally, 0, 1.0, &mut TieBreaker::seeded(0)).unwrap_err();
        assert!(matches!(err, ElectionError::InvalidSeatCount(0)));
    }

    #[test]
    fn fill_respects_existing_seats() {
        let mut allocation: BTreeMap<String, u32> = BTreeMap::new();
        allocation.insert("A".to_string(), 3);
        let tally = votes(&[("A", 50.0), ("B", 50.0)]);
        fill_highest_averages(&tally, &mut allocation, 6, 1.0, &mut TieBreaker::seeded(0)).unwrap();
        assert_eq!(allocation["A"], 3);
        assert_eq!(allocation["B"], 3);
    }
}
