//! Elections within elections: a tree of districts, each with its own ballots
//! and seat results.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A parent's votes and
//! seats are never kept in sync with its children automatically; call
//! [`DistrictTree::aggregate_votes_up`] / [`DistrictTree::aggregate_seats_up`]
//! (or [`DistrictTree::aggregate_subtree`]) once the children are final.

mod elections;
mod spread;

pub use elections::{equal_split, SeatAllotment, SeatDistribution};
pub use spread::{SizeUnit, VoteSpread};

use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::{add_seats, CandidateId, SeatTally};
use crate::voter::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Candidate positions shared by every node of a tree.
pub type Positions = BTreeMap<CandidateId, Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistrictNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    ledger: VoteLedger,
    seats: SeatTally,
}

impl DistrictNode {
    fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut VoteLedger {
        &mut self.ledger
    }

    pub fn seats(&self) -> &SeatTally {
        &self.seats
    }

    pub fn set_seats(&mut self, seats: SeatTally) {
        self.seats = seats;
    }

    pub fn total_votes(&self) -> u64 {
        self.ledger.total_votes()
    }
}

/// Arena of district nodes. The root is created with the tree.
///
/// Removing sub-districts detaches them from their parent; the arena slots
/// stay allocated so every `NodeId` handed out remains valid.
#[derive(Debug, Clone)]
pub struct DistrictTree {
    nodes: Vec<DistrictNode>,
    positions: Positions,
}

impl DistrictTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nodes: vec![DistrictNode::new(name, None)],
            positions: Positions::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> Result<&DistrictNode> {
        self.nodes.get(id.0).ok_or(ElectionError::UnknownDistrict(id.0))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut DistrictNode> {
        self.nodes.get_mut(id.0).ok_or(ElectionError::UnknownDistrict(id.0))
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// The `index`-th sub-district of `parent`.
    pub fn child(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.children(parent)?
            .get(index)
            .copied()
            .ok_or(ElectionError::UnknownDistrict(index))
    }

    pub fn ledger_mut(&mut self, id: NodeId) -> Result<&mut VoteLedger> {
        Ok(self.node_mut(id)?.ledger_mut())
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut Positions {
        &mut self.positions
    }

    pub fn add_position(&mut self, candidate: impl Into<CandidateId>, position: Position) {
        self.positions.insert(candidate.into(), position);
    }

    pub fn add_subdistrict(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(DistrictNode::new(name, Some(parent)));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Appends `n` sub-districts named by running number, continuing from
    /// the number already attached.
    pub fn add_num_subdistricts(&mut self, parent: NodeId, n: usize) -> Result<Vec<NodeId>> {
        let existing = self.children(parent)?.len();
        (existing + 1..=existing + n)
            .map(|number| self.add_subdistrict(parent, number.to_string()))
            .collect()
    }

    pub fn replace_subdistricts(&mut self, parent: NodeId, n: usize) -> Result<Vec<NodeId>> {
        self.clear_subdistricts(parent)?;
        self.add_num_subdistricts(parent, n)
    }

    pub fn clear_subdistricts(&mut self, parent: NodeId) -> Result<()> {
        let detached = std::mem::take(&mut self.node_mut(parent)?.children);
        for child in detached {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// `id` followed by every node below it, parents before children.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?;
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.node(next)?.children.iter().rev());
        }
        Ok(order)
    }

    /// Nodes below `id` without sub-districts of their own.
    pub fn leaves(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut leaves = Vec::new();
        for node in self.descendants(id)? {
            if self.node(node)?.children.is_empty() {
                leaves.push(node);
            }
        }
        Ok(leaves)
    }

    /// Replaces the node's ballots with the sum of its direct children's.
    pub fn aggregate_votes_up(&mut self, id: NodeId) -> Result<()> {
        let mut combined = VoteLedger::new();
        for child in self.children(id)? {
            combined.merge(self.node(*child)?.ledger());
        }
        self.node_mut(id)?.ledger = combined;
        Ok(())
    }

    /// Replaces the node's seats with the sum of its direct children's.
    pub fn aggregate_seats_up(&mut self, id: NodeId) -> Result<&SeatTally> {
        let mut combined = SeatTally::new();
        for child in self.children(id)? {
            add_seats(&mut combined, self.node(*child)?.seats());
        }
        let node = self.node_mut(id)?;
        node.seats = combined;
        Ok(&node.seats)
    }

    /// Bottom-up aggregation of votes and seats for every node under `id`
    /// that has sub-districts, `id` included.
    pub fn aggregate_subtree(&mut self, id: NodeId) -> Result<()> {
        for node in self.descendants(id)?.into_iter().rev() {
            if !self.node(node)?.children.is_empty() {
                self.aggregate_votes_up(node)?;
                self.aggregate_seats_up(node)?;
            }
        }
        Ok(())
    }

    pub fn clear_votes(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.ledger.clear();
        Ok(())
    }

    pub fn clear_seats(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.seats.clear();
        Ok(())
    }

    /// Clears ballots and seats of `id` and everything below it. Positions
    /// are left alone.
    pub fn clear_subtree(&mut self, id: NodeId) -> Result<()> {
        for node in self.descendants(id)? {
            self.clear_votes(node)?;
            self.clear_seats(node)?;
        }
        Ok(())
    }
}
