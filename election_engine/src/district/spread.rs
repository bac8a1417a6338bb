use super::{DistrictTree, NodeId};
use crate::error::{ElectionError, Result};
use crate::tally::CandidateId;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Bounds are vote counts.
    Absolute,
    /// Bounds are percentages of the parent's votes.
    Percent,
}

impl Default for SizeUnit {
    fn default() -> Self {
        SizeUnit::Absolute
    }
}

/// Parameters of a random partition of ballots into sub-districts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSpread {
    /// Smallest number of identical ballots moved in one transfer.
    pub min_chunk: u64,
    pub max_chunk: u64,
    /// Lower and upper size of each sub-district. Equal shares when absent.
    #[serde(default)]
    pub size_bounds: Option<(f64, f64)>,
    #[serde(default)]
    pub unit: SizeUnit,
}

impl VoteSpread {
    pub fn chunks(min_chunk: u64, max_chunk: u64) -> Self {
        Self {
            min_chunk,
            max_chunk,
            size_bounds: None,
            unit: SizeUnit::Absolute,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.min_chunk == 0 || self.min_chunk > self.max_chunk {
            return Err(ElectionError::InvalidSpread(format!(
                "chunk bounds {}..{}",
                self.min_chunk, self.max_chunk
            )));
        }
        if let Some((low, high)) = self.size_bounds {
            if !(low >= 0.0) || !(high >= low) || !high.is_finite() {
                return Err(ElectionError::InvalidSpread(format!("size bounds {}..{}", low, high)));
            }
        }
        Ok(())
    }

    /// Target size of each of `n` sub-districts. Sizes never sum to more
    /// than `total`; they are scaled down if the drawn bounds overshoot.
    fn capacities<R: Rng + ?Sized>(&self, total: u64, n: usize, rng: &mut R) -> Vec<u64> {
        let mut sizes: Vec<u64> = match self.size_bounds {
            None => {
                let base = total / n as u64;
                let extra = (total % n as u64) as usize;
                (0..n).map(|i| base + u64::from(i < extra)).collect()
            }
            Some((low, high)) => (0..n)
                .map(|_| {
                    let drawn = if low == high { low } else { rng.gen_range(low..=high) };
                    match self.unit {
                        SizeUnit::Absolute => drawn.floor() as u64,
                        SizeUnit::Percent => (total as f64 * drawn / 100.0).floor() as u64,
                    }
                })
                .collect(),
        };
        let drawn: u64 = sizes.iter().sum();
        if drawn > total {
            for size in sizes.iter_mut() {
                *size = (*size as u128 * total as u128 / drawn as u128) as u64;
            }
        }
        sizes
    }
}

impl DistrictTree {
    /// Randomly partitions the ballots of `parent` into its sub-districts.
    ///
    /// Each ballot group is moved in chunks of `min_chunk..=max_chunk` to a
    /// random sub-district that is still below its target size. Once every
    /// target is met, leftover ballots go to any sub-district. The
    /// sub-districts' previous votes and seats are discarded.
    pub fn distribute_votes_to_children<R: Rng + ?Sized>(
        &mut self,
        parent: NodeId,
        spread: &VoteSpread,
        rng: &mut R,
    ) -> Result<()> {
        spread.validate()?;
        let children = self.children(parent)?.to_vec();
        if children.is_empty() {
            return Err(ElectionError::InvalidSpread(format!(
                "district {} has no sub-districts",
                self.node(parent)?.name()
            )));
        }
        for child in &children {
            self.clear_votes(*child)?;
            self.clear_seats(*child)?;
        }

        let ballots: Vec<(Vec<CandidateId>, u64)> = self
            .node(parent)?
            .ledger()
            .vote_totals()
            .iter()
            .map(|(ranking, count)| (ranking.clone(), *count))
            .collect();
        let total: u64 = ballots.iter().map(|(_, count)| count).sum();
        let capacity = spread.capacities(total, children.len(), rng);
        let mut filled = vec![0u64; children.len()];
        let mut open: Vec<usize> = (0..children.len()).filter(|i| capacity[*i] > 0).collect();

        for (ranking, count) in ballots {
            let mut remaining = count;
            while remaining > 0 {
                let (slot, give) = if open.is_empty() {
                    let slot = rng.gen_range(0..children.len());
                    let high = spread.max_chunk.min(remaining);
                    (slot, rng.gen_range(spread.min_chunk.min(high)..=high))
                } else {
                    let pick = rng.gen_range(0..open.len());
                    let slot = open[pick];
                    let high = spread.max_chunk.min(remaining).min(capacity[slot] - filled[slot]);
                    let give = rng.gen_range(spread.min_chunk.min(high)..=high);
                    filled[slot] += give;
                    if filled[slot] == capacity[slot] {
                        open.remove(pick);
                    }
                    (slot, give)
                };
                self.ledger_mut(children[slot])?.add_votes(give, &ranking);
                remaining -= give;
            }
        }
        Ok(())
    }

    /// Spreads the votes of every child of `parent` into its own
    /// sub-districts. Children without sub-districts are left as they are.
    pub fn distribute_votes_in_children<R: Rng + ?Sized>(
        &mut self,
        parent: NodeId,
        spread: &VoteSpread,
        rng: &mut R,
    ) -> Result<()> {
        for child in self.children(parent)?.to_vec() {
            if !self.children(child)?.is_empty() {
                self.distribute_votes_to_children(child, spread, rng)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn populated(n_children: usize) -> DistrictTree {
        let mut tree = DistrictTree::new("Country");
        let root = tree.root();
        tree.add_num_subdistricts(root, n_children).unwrap();
        let ledger = tree.ledger_mut(root).unwrap();
        ledger.add_votes(5000, &["A", "B"]);
        ledger.add_votes(3000, &["B", "C"]);
        ledger.add_votes(2001, &["C"]);
        tree
    }

    fn child_totals(tree: &DistrictTree) -> Vec<u64> {
        tree.children(tree.root())
            .unwrap()
            .iter()
            .map(|c| tree.node(*c).unwrap().total_votes())
            .collect()
    }

    #[test]
    fn every_ballot_lands_somewhere() {
        let mut tree = populated(4);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        tree.distribute_votes_to_children(tree.root(), &VoteSpread::chunks(10, 200), &mut rng)
            .unwrap();
        let totals = child_totals(&tree);
        assert_eq!(totals.iter().sum::<u64>(), 10001);
        // Equal targets: 2501, 2500, 2500, 2500.
        assert_eq!(totals, vec![2501, 2500, 2500, 2500]);

        let mut combined = crate::ledger::VoteLedger::new();
        for child in tree.children(tree.root()).unwrap() {
            combined.merge(tree.node(*child).unwrap().ledger());
        }
        assert_eq!(combined.first_prefs(), tree.node(tree.root()).unwrap().ledger().first_prefs());
    }

    #[test]
    fn size_bounds_are_respected_until_full() {
        let mut tree = populated(3);
        let spread = VoteSpread {
            min_chunk: 1,
            max_chunk: 50,
            size_bounds: Some((10.0, 20.0)),
            unit: SizeUnit::Percent,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        tree.distribute_votes_to_children(tree.root(), &spread, &mut rng).unwrap();
        let totals = child_totals(&tree);
        assert_eq!(totals.iter().sum::<u64>(), 10001);
        assert!(totals.iter().all(|t| *t >= 1000));
    }

    #[test]
    fn oversized_bounds_are_scaled_down() {
        let spread = VoteSpread {
            min_chunk: 1,
            max_chunk: 1,
            size_bounds: Some((600.0, 600.0)),
            unit: SizeUnit::Absolute,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let caps = spread.capacities(1000, 2, &mut rng);
        assert_eq!(caps, vec![500, 500]);
    }

    #[test]
    fn same_seed_same_partition() {
        let spread = VoteSpread::chunks(1, 30);
        let mut a = populated(3);
        let mut b = populated(3);
        a.distribute_votes_to_children(a.root(), &spread, &mut ChaCha8Rng::seed_from_u64(2))
            .unwrap();
        b.distribute_votes_to_children(b.root(), &spread, &mut ChaCha8Rng::seed_from_u64(2))
            .unwrap();
        for (x, y) in a.children(a.root()).unwrap().iter().zip(b.children(b.root()).unwrap()) {
            assert_eq!(a.node(*x).unwrap().ledger(), b.node(*y).unwrap().ledger());
        }
    }

    #[test]
    fn invalid_spreads_are_rejected() {
        let mut tree = populated(2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let root = tree.root();
        assert!(tree
            .distribute_votes_to_children(root, &VoteSpread::chunks(0, 5), &mut rng)
            .is_err());
        assert!(tree
            .distribute_votes_to_children(root, &VoteSpread::chunks(6, 5), &mut rng)
            .is_err());

        let mut bare = DistrictTree::new("Empty");
        let err = bare
            .distribute_votes_to_children(bare.root(), &VoteSpread::chunks(1, 5), &mut rng)
            .unwrap_err();
        assert!(matches!(err, ElectionError::InvalidSpread(_)));
    }

    #[test]
    fn nested_spread_skips_leaves() {
        let mut tree = populated(2);
        let root = tree.root();
        let first = tree.child(root, 0).unwrap();
        tree.add_num_subdistricts(first, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let spread = VoteSpread::chunks(5, 40);
        tree.distribute_votes_to_children(root, &spread, &mut rng).unwrap();
        tree.distribute_votes_in_children(root, &spread, &mut rng).unwrap();
        let held = tree.node(first).unwrap().total_votes();
        let below: u64 = tree
            .children(first)
            .unwrap()
            .iter()
            .map(|c| tree.node(*c).unwrap().total_votes())
            .sum();
        assert_eq!(held, below);
    }
}
