//! Most likely governing coalition in an elected chamber.

use crate::district::Positions;
use crate::error::{ElectionError, Result};
use crate::tally::{CandidateId, SeatTally};
use crate::voter::Position;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coalition {
    /// Largest party first.
    pub parties: Vec<CandidateId>,
    pub seats: u32,
    /// Largest distance between two member parties.
    pub spread: f64,
}

fn position<'a>(positions: &'a Positions, party: &str) -> Result<&'a Position> {
    positions
        .get(party)
        .ok_or_else(|| ElectionError::MissingPosition(party.to_string()))
}

fn spread(members: &[&(CandidateId, u32)], positions: &Positions) -> Result<f64> {
    let mut widest: f64 = 0.0;
    for (a, b) in members.iter().tuple_combinations() {
        let distance = position(positions, &a.0)?.distance(position(positions, &b.0)?);
        widest = widest.max(distance);
    }
    Ok(widest)
}

/// A party with a majority of its own governs alone. Otherwise the majority
/// coalition whose members sit closest together wins, fewer parties first
/// when spreads are equal.
pub fn most_likely_coalition(seats: &SeatTally, positions: &Positions) -> Result<Coalition> {
    let mut parties: Vec<(CandidateId, u32)> = seats
        .iter()
        .filter(|(_, held)| **held > 0)
        .map(|(party, held)| (party.clone(), *held))
        .collect();
    parties.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total: u32 = parties.iter().map(|(_, held)| held).sum();

    let (largest, largest_seats) = match parties.first() {
        Some(first) => first.clone(),
        None => return Err(ElectionError::NoCandidates),
    };
    if largest_seats * 2 > total {
        return Ok(Coalition {
            parties: vec![largest],
            seats: largest_seats,
            spread: 0.0,
        });
    }

    let mut best: Option<Coalition> = None;
    for size in 2..=parties.len() {
        for members in parties.iter().combinations(size) {
            let held: u32 = members.iter().map(|(_, s)| s).sum();
            if held * 2 <= total {
                continue;
            }
            let width = spread(&members, positions)?;
            if best.as_ref().map_or(true, |b| width < b.spread) {
                best = Some(Coalition {
                    parties: members.iter().map(|(party, _)| party.clone()).collect(),
                    seats: held,
                    spread: width,
                });
            }
        }
    }
    best.ok_or(ElectionError::NoCandidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(entries: &[(&str, u32)]) -> SeatTally {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn compass() -> Positions {
        let mut positions = Positions::new();
        positions.insert("Conservative".into(), Position::new(0.5, 0.1));
        positions.insert("Labour".into(), Position::new(-0.6, -0.2));
        positions.insert("Liberal".into(), Position::new(0.2, -1.0));
        positions.insert("Green".into(), Position::new(-0.7, -1.6));
        positions.insert("Nationalist".into(), Position::new(0.1, 1.3));
        positions
    }

    #[test]
    fn majority_party_governs_alone() {
        let chamber = seats(&[("Conservative", 330), ("Labour", 250), ("Liberal", 70)]);
        let coalition = most_likely_coalition(&chamber, &compass()).unwrap();
        assert_eq!(coalition.parties, vec!["Conservative"]);
        assert_eq!(coalition.seats, 330);
    }

    #[test]
    fn closest_majority_wins() {
        let chamber = seats(&[
            ("Conservative", 40),
            ("Labour", 35),
            ("Green", 16),
            ("Nationalist", 9),
        ]);
        let coalition = most_likely_coalition(&chamber, &compass()).unwrap();
        // Labour-Green (1.40 apart) also holds a majority.
        assert_eq!(coalition.parties, vec!["Conservative", "Labour"]);
        assert_eq!(coalition.seats, 75);
        assert!(coalition.seats * 2 > 100);
    }

    #[test]
    fn smaller_spread_beats_fewer_parties() {
        let chamber = seats(&[
            ("Conservative", 30),
            ("Green", 30),
            ("Labour", 20),
            ("Liberal", 20),
        ]);
        let coalition = most_likely_coalition(&chamber, &compass()).unwrap();
        assert_eq!(coalition.parties, vec!["Conservative", "Labour", "Liberal"]);
        assert_eq!(coalition.seats, 70);
        assert!(coalition.spread < 1.2);
    }

    #[test]
    fn missing_position_is_reported() {
        let chamber = seats(&[("Conservative", 40), ("Pirates", 40), ("Labour", 20)]);
        let err = most_likely_coalition(&chamber, &compass()).unwrap_err();
        assert!(matches!(err, ElectionError::MissingPosition(ref p) if p == "Pirates"));
    }

    #[test]
    fn empty_chamber_has_no_coalition() {
        assert!(most_likely_coalition(&SeatTally::new(), &compass()).is_err());
    }
}
