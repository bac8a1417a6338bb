use super::{DistrictTree, NodeId};
use crate::apportion::ApportionMethod;
use crate::error::{ElectionError, Result};
use crate::system::{count, ElectoralSystem};
use crate::tally::{SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a seat total is divided among sub-districts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "kebab-case")]
pub enum SeatDistribution {
    /// Proportional to each child's vote count.
    Population { method: ApportionMethod },
    /// As equal as possible; the first children take the remainder.
    Equal,
}

impl Default for SeatDistribution {
    fn default() -> Self {
        SeatDistribution::Population {
            method: ApportionMethod::HARE,
        }
    }
}

/// Seats each sub-district elects in a per-child run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "allot", rename_all = "kebab-case")]
pub enum SeatAllotment {
    /// Every child elects the same number of seats.
    PerChild { seats: u32 },
    /// A national total first divided among the children.
    Total { seats: u32, distribution: SeatDistribution },
}

impl Default for SeatAllotment {
    fn default() -> Self {
        SeatAllotment::PerChild { seats: 1 }
    }
}

/// `seats` split as evenly as possible over `children`.
pub fn equal_split(children: &[NodeId], seats: u32) -> BTreeMap<NodeId, u32> {
    let n = children.len() as u32;
    if n == 0 {
        return BTreeMap::new();
    }
    let base = seats / n;
    let extra = (seats % n) as usize;
    children
        .iter()
        .enumerate()
        .map(|(i, child)| (*child, base + u32::from(i < extra)))
        .collect()
}

impl DistrictTree {
    /// Apportions `seats` among the children of `parent`, weighted by the
    /// votes each child holds.
    pub fn seats_per_child(
        &self,
        parent: NodeId,
        seats: u32,
        method: &ApportionMethod,
        tiebreak: &mut TieBreaker,
    ) -> Result<BTreeMap<NodeId, u32>> {
        let mut population: Tally<NodeId> = Tally::new();
        for child in self.children(parent)? {
            population.insert(*child, self.node(*child)?.total_votes() as f64);
        }
        method.apportion(&population, seats, tiebreak)
    }

    fn allot(
        &self,
        parent: NodeId,
        seats: u32,
        distribution: &SeatDistribution,
        tiebreak: &mut TieBreaker,
    ) -> Result<BTreeMap<NodeId, u32>> {
        if seats == 0 {
            return Err(ElectionError::InvalidSeatCount(0));
        }
        match distribution {
            SeatDistribution::Population { method } => self.seats_per_child(parent, seats, method, tiebreak),
            SeatDistribution::Equal => {
                let children = self.children(parent)?;
                if children.is_empty() {
                    return Err(ElectionError::NoCandidates);
                }
                Ok(equal_split(children, seats))
            }
        }
    }

    /// Gives every child of `parent` a fresh set of sub-districts, as many as
    /// its share of `seats`. Used to build national > state > constituency
    /// trees, e.g. House seats handed to states by Huntington-Hill.
    pub fn distribute_seats_across_children(
        &mut self,
        parent: NodeId,
        seats: u32,
        distribution: &SeatDistribution,
        tiebreak: &mut TieBreaker,
    ) -> Result<BTreeMap<NodeId, u32>> {
        let allotment = self.allot(parent, seats, distribution, tiebreak)?;
        for (child, n) in &allotment {
            self.replace_subdistricts(*child, *n as usize)?;
        }
        Ok(allotment)
    }

    /// Runs `system` in every child of `parent`, replacing each child's seat
    /// tally. Children allotted no seats end up with an empty tally.
    pub fn run_election_across_children(
        &mut self,
        parent: NodeId,
        system: &ElectoralSystem,
        allotment: &SeatAllotment,
        tiebreak: &mut TieBreaker,
        trace: &mut Trace,
    ) -> Result<BTreeMap<NodeId, SeatTally>> {
        let seats_for: BTreeMap<NodeId, u32> = match allotment {
            SeatAllotment::PerChild { seats } => {
                if *seats == 0 {
                    return Err(ElectionError::InvalidSeatCount(0));
                }
                self.children(parent)?.iter().map(|child| (*child, *seats)).collect()
            }
            SeatAllotment::Total { seats, distribution } => self.allot(parent, *seats, distribution, tiebreak)?,
        };

        // Count every child before touching any seat tally, so a failed
        // count leaves the tree as it was.
        let mut results = BTreeMap::new();
        for (child, seats) in seats_for {
            let node = self.node(child)?;
            let won = if seats == 0 {
                SeatTally::new()
            } else {
                trace.heading(format!("District {} ({} seats)", node.name(), seats));
                count(node.ledger(), system, seats, tiebreak, trace)?.seats
            };
            results.insert(child, won);
        }
        for (child, won) in &results {
            self.node_mut(*child)?.set_seats(won.clone());
        }
        Ok(results)
    }

    /// Per-child elections followed by summing the children's seats into
    /// `parent`.
    pub fn run_general_election(
        &mut self,
        parent: NodeId,
        system: &ElectoralSystem,
        allotment: &SeatAllotment,
        tiebreak: &mut TieBreaker,
        trace: &mut Trace,
    ) -> Result<SeatTally> {
        self.run_election_across_children(parent, system, allotment, tiebreak, trace)?;
        let seats = self.aggregate_seats_up(parent)?.clone();
        trace.outcome(format!(
            "{} seats are filled across {} districts.",
            seats.values().sum::<u32>(),
            self.children(parent)?.len()
        ));
        Ok(seats)
    }
}
