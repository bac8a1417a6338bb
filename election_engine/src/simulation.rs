//! A whole simulated electorate: the district tree, its voters and the seeded
//! random source every draw comes from.

use crate::coalition::{most_likely_coalition, Coalition};
use crate::district::{DistrictTree, SeatAllotment};
use crate::error::Result;
use crate::system::ElectoralSystem;
use crate::tally::SeatTally;
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use crate::voter::{Position, Voter};

#[derive(Debug, Clone)]
pub struct Simulation {
    pub tree: DistrictTree,
    pub voters: Vec<Voter>,
    tiebreak: TieBreaker,
}

impl Simulation {
    pub fn new(tree: DistrictTree, seed: Option<u64>) -> Self {
        Self {
            tree,
            voters: Vec::new(),
            tiebreak: TieBreaker::from_seed(seed),
        }
    }

    pub fn tiebreak(&mut self) -> &mut TieBreaker {
        &mut self.tiebreak
    }

    /// Adds `n` voters at random positions, registered nowhere yet.
    pub fn populate(&mut self, n: usize) {
        let start = self.voters.len();
        for i in start..start + n {
            let position = Position::random(self.tiebreak.rng());
            self.voters.push(Voter::new(format!("voter-{}", i + 1), position));
        }
    }

    /// Replaces the root's sub-districts with `n` fresh ones and registers
    /// every voter in the root and in one sub-district, consecutive voters
    /// sharing a district.
    pub fn redistrict(&mut self, n: usize) -> Result<()> {
        let root = self.tree.root();
        let districts = self.tree.replace_subdistricts(root, n)?;
        let len = self.voters.len().max(1);
        for (i, voter) in self.voters.iter_mut().enumerate() {
            let mut registrations = vec![root];
            if !districts.is_empty() {
                registrations.push(districts[i * districts.len() / len]);
            }
            voter.replace_registrations(registrations);
        }
        Ok(())
    }

    /// One election: clear every ballot and seat, let every voter vote, then
    /// run `system` in each district and sum the seats at the root.
    pub fn run_cycle(
        &mut self,
        system: &ElectoralSystem,
        allotment: &SeatAllotment,
        trace: &mut Trace,
    ) -> Result<SeatTally> {
        let root = self.tree.root();
        self.tree.clear_subtree(root)?;
        for voter in &self.voters {
            voter.vote(&mut self.tree)?;
        }
        self.tree
            .run_general_election(root, system, allotment, &mut self.tiebreak, trace)
    }

    /// Most likely coalition in the chamber elected by the last cycle.
    pub fn coalition(&self) -> Result<Coalition> {
        let root = self.tree.node(self.tree.root())?;
        most_likely_coalition(root.seats(), self.tree.positions())
    }
}
