//! Election files: the JSON description of a whole election.
//!
//! ```json
//! {
//!   "name": "General election",
//!   "system": "irv",
//!   "positions": { "Red": { "economic": -0.5, "social": 0.2 } },
//!   "districts": [
//!     { "name": "North", "ballots": [{ "ranking": ["Red", "Blue"], "count": 120 }] }
//!   ]
//! }
//! ```

use crate::apportion::{ApportionMethod, ChamberReduction, MixedMember, Threshold};
use crate::district::{DistrictTree, NodeId, Positions, SeatAllotment, VoteSpread};
use crate::error::{ElectionError, Result};
use crate::ledger::Ballot;
use crate::system::{ElectoralSystem, RunOptions};
use crate::tiebreak::TieBreaker;
use crate::util::read_serialized;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictConfig {
    pub name: String,
    #[serde(default)]
    pub ballots: Vec<Ballot>,
    #[serde(default)]
    pub districts: Vec<DistrictConfig>,
}

/// Top-level ballots spread at random over `districts` new sub-districts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadConfig {
    pub districts: usize,
    #[serde(flatten)]
    pub spread: VoteSpread,
}

/// A list tier added on top of the district results, counted over the
/// first preferences of the whole electorate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ListTier {
    Parallel {
        seats: u32,
        #[serde(default)]
        method: ApportionMethod,
        #[serde(default)]
        threshold: Option<Threshold>,
    },
    MixedMember(MixedMember),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionFile {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    pub system: ElectoralSystem,
    /// Seats per district; ignored when `allotment` is set.
    #[serde(default = "one")]
    pub seats: u32,
    #[serde(default)]
    pub allotment: Option<SeatAllotment>,
    #[serde(default)]
    pub positions: Positions,
    /// Ballots of a single-district election, or the electorate to spread
    /// when `spread` is set. Ignored when `districts` is given.
    #[serde(default)]
    pub ballots: Vec<Ballot>,
    #[serde(default)]
    pub districts: Vec<DistrictConfig>,
    #[serde(default)]
    pub spread: Option<SpreadConfig>,
    #[serde(default)]
    pub list_tier: Option<ListTier>,
    /// Applied last, to the whole chamber.
    #[serde(default)]
    pub reduction: Option<ChamberReduction>,
    #[serde(default)]
    pub options: RunOptions,
}

fn check_ballots(ballots: &[Ballot]) -> Result<()> {
    for ballot in ballots {
        let mut seen = BTreeSet::new();
        for candidate in &ballot.ranking {
            if !seen.insert(candidate) {
                return Err(ElectionError::DuplicateRanking(candidate.clone()));
            }
        }
    }
    Ok(())
}

fn check_districts(districts: &[DistrictConfig]) -> Result<()> {
    for district in districts {
        check_ballots(&district.ballots)?;
        check_districts(&district.districts)?;
    }
    Ok(())
}

fn add_districts(tree: &mut DistrictTree, parent: NodeId, districts: &[DistrictConfig]) -> Result<()> {
    for district in districts {
        let id = tree.add_subdistrict(parent, district.name.clone())?;
        let ledger = tree.ledger_mut(id)?;
        for ballot in &district.ballots {
            ledger.add_ballot(ballot);
        }
        add_districts(tree, id, &district.districts)?;
    }
    Ok(())
}

impl ElectionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file: ElectionFile = read_serialized(path)?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seats == 0 {
            return Err(ElectionError::InvalidSeatCount(0));
        }
        check_ballots(&self.ballots)?;
        check_districts(&self.districts)
    }

    /// How many seats each district run fills.
    pub fn allotment(&self) -> SeatAllotment {
        self.allotment.unwrap_or(SeatAllotment::PerChild { seats: self.seats })
    }

    /// Builds the district tree with every ballot in place and the votes of
    /// each parent aggregated from its sub-districts.
    pub fn build_tree(&self, tiebreak: &mut TieBreaker) -> Result<DistrictTree> {
        let mut tree = DistrictTree::new(self.name.clone());
        *tree.positions_mut() = self.positions.clone();
        let root = tree.root();

        if !self.districts.is_empty() {
            add_districts(&mut tree, root, &self.districts)?;
            tree.aggregate_subtree(root)?;
            return Ok(tree);
        }

        let ledger = tree.ledger_mut(root)?;
        for ballot in &self.ballots {
            ledger.add_ballot(ballot);
        }
        if let Some(config) = &self.spread {
            tree.add_num_subdistricts(root, config.districts)?;
            tree.distribute_votes_to_children(root, &config.spread, tiebreak.rng())?;
        }
        Ok(tree)
    }
}
