//! Spatial voters: a position on the economic/social plane turned into a
//! ranked ballot.

use crate::district::{DistrictTree, NodeId, Positions};
use crate::error::{ElectionError, Result};
use crate::tally::CandidateId;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Spread of randomly placed voters on each axis.
pub const ECONOMIC_SPREAD: f64 = 0.5;
pub const SOCIAL_SPREAD: f64 = 1.0;

/// A point on the political compass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub economic: f64,
    pub social: f64,
}

impl Position {
    pub fn new(economic: f64, social: f64) -> Self {
        Self { economic, social }
    }

    /// Economic ~ N(0, 0.5), social ~ N(0, 1).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let economic: f64 = rng.sample(StandardNormal);
        let social: f64 = rng.sample(StandardNormal);
        Self {
            economic: economic * ECONOMIC_SPREAD,
            social: social * SOCIAL_SPREAD,
        }
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        let de = self.economic - other.economic;
        let ds = self.social - other.social;
        de * de + ds * ds
    }

    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    pub name: String,
    pub position: Position,
    registrations: Vec<NodeId>,
}

impl Voter {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            registrations: Vec::new(),
        }
    }

    pub fn random<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Self {
        Self::new(name, Position::random(rng))
    }

    pub fn registrations(&self) -> &[NodeId] {
        &self.registrations
    }

    pub fn register(&mut self, district: NodeId) {
        self.registrations.push(district);
    }

    /// Drops one registration for `district`, if any.
    pub fn deregister(&mut self, district: NodeId) {
        if let Some(i) = self.registrations.iter().position(|r| *r == district) {
            self.registrations.remove(i);
        }
    }

    pub fn replace_registrations(&mut self, districts: Vec<NodeId>) {
        self.registrations = districts;
    }

    pub fn reposition(&mut self, position: Position) {
        self.position = position;
    }

    /// Every candidate, nearest first. Equal distances fall back to id order.
    pub fn ballot(&self, positions: &Positions) -> Vec<CandidateId> {
        let mut by_distance: Vec<(f64, &CandidateId)> = positions
            .iter()
            .map(|(candidate, position)| (self.position.distance_squared(position), candidate))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        by_distance.into_iter().map(|(_, candidate)| candidate.clone()).collect()
    }

    /// Casts the ballot in every district the voter is registered in.
    pub fn vote(&self, tree: &mut DistrictTree) -> Result<()> {
        let ballot = self.ballot(tree.positions());
        for district in &self.registrations {
            tree.ledger_mut(*district)?.add_vote(&ballot);
        }
        Ok(())
    }

    /// Casts the ballot only in the `index`-th registration.
    pub fn vote_in(&self, tree: &mut DistrictTree, index: usize) -> Result<()> {
        let district = *self
            .registrations
            .get(index)
            .ok_or(ElectionError::UnknownDistrict(index))?;
        let ballot = self.ballot(tree.positions());
        tree.ledger_mut(district)?.add_vote(&ballot);
        Ok(())
    }
}
