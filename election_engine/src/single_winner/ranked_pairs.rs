//! Ranked Pairs (Tideman), a Condorcet method.

use super::Outcome;
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::tally::CandidateId;
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of one head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairResult {
    pub winner: CandidateId,
    pub loser: CandidateId,
    pub winner_votes: f64,
    pub margin: f64,
    /// False when locking this pair would have closed a cycle.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPairsResult {
    /// Pairs in processing order.
    pub pairs: Vec<PairResult>,
    pub ranking: Vec<CandidateId>,
    pub outcome: Outcome,
}

type Graph = BTreeMap<CandidateId, BTreeSet<CandidateId>>;

/// Whether `to` can be reached from `from` along locked edges.
fn reaches(graph: &Graph, from: &str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = BTreeSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = graph.get(node) {
            stack.extend(next.iter().map(String::as_str));
        }
    }
    false
}

/// Places a newly locked `winner -> loser` edge into the running ranking.
fn insert_pair(ranking: &mut Vec<CandidateId>, winner: &str, loser: &str) {
    let w = ranking.iter().position(|c| c == winner);
    let l = ranking.iter().position(|c| c == loser);
    match (w, l) {
        (Some(w), Some(l)) => {
            if w > l {
                let moved = ranking.remove(w);
                ranking.insert(l, moved);
            }
        }
        (Some(w), None) => ranking.insert(w + 1, loser.to_string()),
        (None, Some(l)) => ranking.insert(l, winner.to_string()),
        (None, None) => {
            ranking.push(winner.to_string());
            ranking.push(loser.to_string());
        }
    }
}

/// Reorders `ranking` so every locked edge points downwards, keeping the
/// existing order wherever no edge (direct or transitive) decides it.
fn settle(ranking: &[CandidateId], graph: &Graph) -> Vec<CandidateId> {
    let mut remaining: Vec<&CandidateId> = ranking.iter().collect();
    let mut settled = Vec::with_capacity(ranking.len());
    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .position(|candidate| {
                !remaining.iter().any(|other| {
                    graph
                        .get(other.as_str())
                        .map_or(false, |beaten| beaten.contains(candidate.as_str()))
                })
            })
            .unwrap_or(0);
        settled.push(remaining.remove(next).clone());
    }
    settled
}

/// Locks pairwise victories from the largest margin down, skipping any that
/// would create a cycle, and ranks candidates by the locked graph.
pub fn ranked_pairs(ledger: &VoteLedger, tiebreak: &mut TieBreaker, trace: &mut Trace) -> Result<RankedPairsResult> {
    let candidates: Vec<CandidateId> = ledger.all_candidates().into_iter().collect();
    if candidates.is_empty() {
        return Err(ElectionError::NoCandidates);
    }

    trace.heading("Ranked Pairs");

    if candidates.len() == 1 {
        let total = ledger.total_votes() as f64;
        return Ok(RankedPairsResult {
            pairs: Vec::new(),
            ranking: candidates.clone(),
            outcome: Outcome {
                winner: candidates[0].clone(),
                tally: total,
                margin: total,
                unique: true,
            },
        });
    }

    let mut pairs = Vec::new();
    for (a, b) in candidates.iter().tuple_combinations() {
        let result = ledger.head_to_head(a, b, tiebreak)?;
        let loser = if &result.winner == a { b.clone() } else { a.clone() };
        pairs.push(PairResult {
            winner: result.winner,
            loser,
            winner_votes: result.tally,
            margin: result.margin,
            locked: false,
        });
    }
    pairs.sort_by(|x, y| {
        y.margin
            .total_cmp(&x.margin)
            .then_with(|| y.winner_votes.total_cmp(&x.winner_votes))
            .then_with(|| x.winner.cmp(&y.winner))
            .then_with(|| x.loser.cmp(&y.loser))
    });

    trace.line("The pair preferences, sorted by margin, are as follows:");
    let mut graph = Graph::new();
    let mut ranking: Vec<CandidateId> = Vec::new();
    for pair in pairs.iter_mut() {
        trace.line(format!(
            "  {} over {} by {} ({} votes)",
            pair.winner, pair.loser, pair.margin, pair.winner_votes
        ));
        if reaches(&graph, &pair.loser, &pair.winner) {
            trace.line("  The pair is not locked in due to the cycle that would be created.");
            continue;
        }
        graph
            .entry(pair.winner.clone())
            .or_insert_with(BTreeSet::new)
            .insert(pair.loser.clone());
        pair.locked = true;
        insert_pair(&mut ranking, &pair.winner, &pair.loser);
        ranking = settle(&ranking, &graph);
        trace.line(format!("  {}", ranking.join(" > ")));
    }

    let top = ranking[0].clone();
    let second = ranking[1].clone();
    let pairwise = ledger.pairwise_tally(&top, &second);
    let top_votes = pairwise.get(&top).copied().unwrap_or(0.0);
    let second_votes = pairwise.get(&second).copied().unwrap_or(0.0);
    let outcome = Outcome {
        winner: top,
        tally: top_votes,
        margin: top_votes - second_votes,
        unique: top_votes != second_votes,
    };

    trace.outcome(format!("The final ranking is {}", ranking.join(" > ")));
    Ok(RankedPairsResult {
        pairs,
        ranking,
        outcome,
    })
}
