//! Injectable source for every random decision the engine makes.
//!
//! Algorithms never reach for a global RNG. Callers hand in a [`TieBreaker`],
//! which either draws from a seeded `ChaCha8Rng` or, under the lexicographic
//! policy, always takes the first of the (id-sorted) tied entries.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiePolicy {
    /// Uniform draw among tied entries.
    Random,
    /// Always the first tied entry (callers sort ties by id).
    Lexicographic,
}

#[derive(Debug, Clone)]
pub struct TieBreaker {
    rng: ChaCha8Rng,
    policy: TiePolicy,
}

impl TieBreaker {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            policy: TiePolicy::Random,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            policy: TiePolicy::Random,
        }
    }

    /// Fixed seed when given, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn lexicographic() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(0),
            policy: TiePolicy::Lexicographic,
        }
    }

    pub fn policy(&self) -> TiePolicy {
        self.policy
    }

    /// Index in `0..len` of the chosen entry. `len` must be non-zero.
    pub fn choose_index(&mut self, len: usize) -> usize {
        match self.policy {
            TiePolicy::Random if len > 1 => self.rng.gen_range(0..len),
            _ => 0,
        }
    }

    pub fn choose<'a, T>(&mut self, tied: &'a [T]) -> Option<&'a T> {
        if tied.is_empty() {
            return None;
        }
        let i = self.choose_index(tied.len());
        tied.get(i)
    }

    /// `amount` entries of `tied`, kept in their original order.
    pub fn sample<T: Clone>(&mut self, tied: &[T], amount: usize) -> Vec<T> {
        let amount = amount.min(tied.len());
        match self.policy {
            TiePolicy::Lexicographic => tied[..amount].to_vec(),
            TiePolicy::Random => {
                let mut picked = index::sample(&mut self.rng, tied.len(), amount).into_vec();
                picked.sort_unstable();
                picked.into_iter().map(|i| tied[i].clone()).collect()
            }
        }
    }

    /// Underlying generator, for callers that need more than tie-breaks
    /// (vote spreading, random positions).
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl Default for TieBreaker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_takes_first() {
        let mut tb = TieBreaker::lexicographic();
        let tied = ["A", "B", "C"];
        assert_eq!(tb.choose(&tied), Some(&"A"));
        assert_eq!(tb.sample(&tied, 2), vec!["A", "B"]);
    }

    #[test]
    fn same_seed_same_draws() {
        let tied: Vec<u32> = (0..20).collect();
        let mut a = TieBreaker::seeded(7);
        let mut b = TieBreaker::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.choose(&tied), b.choose(&tied));
        }
        assert_eq!(a.sample(&tied, 5), b.sample(&tied, 5));
    }

    #[test]
    fn sample_keeps_order_and_size() {
        let tied: Vec<u32> = (0..10).collect();
        let mut tb = TieBreaker::seeded(3);
        let picked = tb.sample(&tied, 4);
        assert_eq!(picked.len(), 4);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tb.sample(&tied, 50).len(), 10);
    }

    #[test]
    fn empty_choice_is_none() {
        let mut tb = TieBreaker::seeded(1);
        let tied: [u8; 0] = [];
        assert!(tb.choose(&tied).is_none());
    }
}
