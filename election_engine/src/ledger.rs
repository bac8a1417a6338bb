//! Ranked ballots and the per-district ledger that counts them.

use crate::error::{ElectionError, Result};
use crate::single_winner::{plurality, Outcome};
use crate::tally::{self, CandidateId, Tally};
use crate::tiebreak::TieBreaker;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn one() -> u64 {
    1
}

/// One preference order, cast `count` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub ranking: Vec<CandidateId>,
    #[serde(default = "one")]
    pub count: u64,
}

impl Ballot {
    pub fn new(ranking: Vec<CandidateId>, count: u64) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for candidate in &ranking {
            if !seen.insert(candidate) {
                return Err(ElectionError::DuplicateRanking(candidate.clone()));
            }
        }
        Ok(Ballot { ranking, count })
    }

    pub fn first(&self) -> Option<&CandidateId> {
        self.ranking.first()
    }
}

/// Highest-ranked entry of `ranking` accepted by `active`.
pub fn highest_active<'a, F>(ranking: &'a [CandidateId], active: F) -> Option<&'a CandidateId>
where
    F: Fn(&CandidateId) -> bool,
{
    ranking.iter().find(|c| active(c))
}

/// Distinct ballot sequences with their multiplicity, plus the derived
/// first-preference count. Seats are not stored here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteLedger {
    vote_totals: BTreeMap<Vec<CandidateId>, u64>,
    first_prefs: BTreeMap<CandidateId, u64>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vote<S: AsRef<str>>(&mut self, sequence: &[S]) {
        self.add_votes(1, sequence);
    }

    /// Adds `count` identical ballots. Empty sequences are ignored; a repeated
    /// candidate keeps only its highest rank.
    pub fn add_votes<S: AsRef<str>>(&mut self, count: u64, sequence: &[S]) {
        if sequence.is_empty() || count == 0 {
            return;
        }
        let mut seen = BTreeSet::new();
        let ranking: Vec<CandidateId> = sequence
            .iter()
            .map(|c| c.as_ref().to_string())
            .filter(|c| seen.insert(c.clone()))
            .collect();
        *self.first_prefs.entry(ranking[0].clone()).or_insert(0) += count;
        *self.vote_totals.entry(ranking).or_insert(0) += count;
    }

    pub fn add_ballot(&mut self, ballot: &Ballot) {
        self.add_votes(ballot.count, &ballot.ranking);
    }

    /// Adds every ballot of `other`.
    pub fn merge(&mut self, other: &VoteLedger) {
        for (ranking, count) in &other.vote_totals {
            self.add_votes(*count, ranking);
        }
    }

    pub fn clear(&mut self) {
        self.vote_totals.clear();
        self.first_prefs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vote_totals.is_empty()
    }

    pub fn vote_totals(&self) -> &BTreeMap<Vec<CandidateId>, u64> {
        &self.vote_totals
    }

    pub fn first_prefs(&self) -> &BTreeMap<CandidateId, u64> {
        &self.first_prefs
    }

    pub fn first_pref_tally(&self) -> Tally {
        tally::to_tally(&self.first_prefs)
    }

    pub fn ballots(&self) -> Vec<Ballot> {
        self.vote_totals
            .iter()
            .map(|(ranking, count)| Ballot {
                ranking: ranking.clone(),
                count: *count,
            })
            .collect()
    }

    pub fn total_votes(&self) -> u64 {
        self.vote_totals.values().sum()
    }

    /// First-preference shares in percent.
    pub fn percentages(&self, digits: Option<u32>) -> BTreeMap<CandidateId, f64> {
        tally::percentages(&self.first_prefs, digits)
    }

    /// Every candidate ranked anywhere on any ballot.
    pub fn all_candidates(&self) -> BTreeSet<CandidateId> {
        self.vote_totals
            .keys()
            .flat_map(|ranking| ranking.iter().cloned())
            .collect()
    }

    pub fn longest_ballot(&self) -> usize {
        self.vote_totals.keys().map(Vec::len).max().unwrap_or(0)
    }

    /// Each ballot counted for its highest-ranked candidate in `active`.
    /// Every active candidate gets an entry; the second value is the number of
    /// exhausted ballots that rank none of them.
    pub fn tally_among(&self, active: &BTreeSet<CandidateId>) -> (Tally, u64) {
        let mut counts: Tally = active.iter().map(|c| (c.clone(), 0.0)).collect();
        let mut exhausted = 0;
        for (ranking, count) in &self.vote_totals {
            match highest_active(ranking, |c| active.contains(c)) {
                Some(candidate) => {
                    if let Some(v) = counts.get_mut(candidate) {
                        *v += *count as f64;
                    }
                }
                None => exhausted += count,
            }
        }
        (counts, exhausted)
    }

    /// Votes for `a` and `b` when only the two of them are compared.
    pub fn pairwise_tally(&self, a: &str, b: &str) -> Tally {
        let mut pair = BTreeSet::new();
        pair.insert(a.to_string());
        pair.insert(b.to_string());
        self.tally_among(&pair).0
    }

    /// One-to-one match between `a` and `b`, decided by plurality.
    pub fn head_to_head(&self, a: &str, b: &str, tiebreak: &mut TieBreaker) -> Result<Outcome> {
        plurality(&self.pairwise_tally(a, b), tiebreak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_prefs_follow_ballots() {
        let mut ledger = VoteLedger::new();
        ledger.add_vote(&["A", "B", "C"]);
        ledger.add_votes(3, &["B", "A"]);
        ledger.add_votes(2, &["A", "C"]);
        assert_eq!(ledger.first_prefs()["A"], 3);
        assert_eq!(ledger.first_prefs()["B"], 3);
        assert_eq!(ledger.total_votes(), 6);
        assert_eq!(ledger.vote_totals().len(), 3);
    }

    #[test]
    fn empty_ballots_are_ignored() {
        let mut ledger = VoteLedger::new();
        let empty: [&str; 0] = [];
        ledger.add_vote(&empty);
        ledger.add_votes(0, &["A"]);
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_votes(), 0);
    }

    #[test]
    fn repeated_candidates_keep_highest_rank() {
        let mut ledger = VoteLedger::new();
        ledger.add_vote(&["A", "B", "A"]);
        let key = vec!["A".to_string(), "B".to_string()];
        assert_eq!(ledger.vote_totals()[&key], 1);
        assert!(Ballot::new(vec!["A".into(), "A".into()], 1).is_err());
    }

    #[test]
    fn all_candidates_covers_lower_ranks() {
        let mut ledger = VoteLedger::new();
        ledger.add_vote(&["A", "D"]);
        ledger.add_vote(&["B"]);
        let all: Vec<String> = ledger.all_candidates().into_iter().collect();
        assert_eq!(all, vec!["A", "B", "D"]);
    }

    #[test]
    fn head_to_head_credits_earlier_rank() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(4, &["C", "A", "B"]);
        ledger.add_votes(3, &["B", "A"]);
        ledger.add_votes(5, &["C"]);
        let mut tb = TieBreaker::seeded(1);
        let result = ledger.head_to_head("A", "B", &mut tb).unwrap();
        assert_eq!(result.winner, "A");
        assert_eq!(result.tally, 4.0);
        assert_eq!(result.margin, 1.0);
        assert!(result.unique);
    }

    #[test]
    fn tally_among_counts_exhausted() {
        let mut ledger = VoteLedger::new();
        ledger.add_votes(2, &["A", "B"]);
        ledger.add_votes(1, &["C"]);
        let active: BTreeSet<String> = vec!["B".to_string()].into_iter().collect();
        let (counts, exhausted) = ledger.tally_among(&active);
        assert_eq!(counts["B"], 2.0);
        assert_eq!(exhausted, 1);
    }

    #[test]
    fn merge_adds_ballots() {
        let mut a = VoteLedger::new();
        a.add_votes(2, &["X", "Y"]);
        let mut b = VoteLedger::new();
        b.add_votes(3, &["X", "Y"]);
        b.add_vote(&["Y"]);
        a.merge(&b);
        assert_eq!(a.total_votes(), 6);
        assert_eq!(a.first_prefs()["X"], 5);
        assert_eq!(a.percentages(Some(1))["Y"], 16.7);
    }
}
