//! The JSON report of a tabulated election file.

use crate::apportion::{mixed_member, parallel};
use crate::coalition::{most_likely_coalition, Coalition};
use crate::config::{ElectionFile, ListTier};
use crate::error::Result;
use crate::single_winner::Outcome;
use crate::system::{count, RunOptions};
use crate::tally::{percentages, sorted_desc, to_tally, SeatTally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub name: String,
    pub date: Option<String>,
    pub system: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    /// SHA-1 of the election file the report was built from.
    #[serde(rename = "inputDigest")]
    pub input_digest: Option<String>,
    #[serde(rename = "tieBreakSeed")]
    pub tie_break_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub name: String,
    pub votes: u64,
    #[serde(rename = "votePercent")]
    pub vote_percent: f64,
    pub seats: u32,
    #[serde(rename = "seatPercent")]
    pub seat_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictResult {
    pub name: String,
    #[serde(rename = "ballotCount")]
    pub ballot_count: u64,
    pub seats: SeatTally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionReport {
    pub info: ReportInfo,
    #[serde(rename = "ballotCount")]
    pub ballot_count: u64,
    #[serde(rename = "totalSeats")]
    pub total_seats: u32,
    /// Most first preferences first.
    pub candidates: Vec<CandidateResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub districts: Vec<DistrictResult>,
    /// Set for single-district, single-winner elections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coalition: Option<Coalition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl ElectionReport {
    /// Tabulates `file` under `options`: district runs, the optional list
    /// tier and the coalition analysis.
    pub fn generate(file: &ElectionFile, options: &RunOptions, input_digest: Option<String>) -> Result<Self> {
        let mut tiebreak = options.tiebreaker();
        let mut trace = options.trace();
        let mut tree = file.build_tree(&mut tiebreak)?;
        let root = tree.root();

        let mut outcome = None;
        let district_seats = if tree.children(root)?.is_empty() {
            let counted = count(
                tree.node(root)?.ledger(),
                &file.system,
                file.seats,
                &mut tiebreak,
                &mut trace,
            )?;
            outcome = counted.outcome;
            counted.seats
        } else {
            tree.run_general_election(root, &file.system, &file.allotment(), &mut tiebreak, &mut trace)?
        };

        let ledger = tree.node(root)?.ledger();
        let seats = match &file.list_tier {
            None => district_seats,
            Some(ListTier::Parallel {
                seats,
                method,
                threshold,
            }) => parallel(
                &district_seats,
                &ledger.first_pref_tally(),
                *seats,
                method,
                threshold.as_ref(),
                &mut tiebreak,
            )?,
            Some(ListTier::MixedMember(config)) => {
                mixed_member(&district_seats, &ledger.first_pref_tally(), config, &mut tiebreak)?
            }
        };
        let seats = match &file.reduction {
            Some(reduction) => reduction
                .reduce(&seats, &mut tiebreak, &mut trace)?
                .pop()
                .unwrap_or(seats),
            None => seats,
        };
        tree.node_mut(root)?.set_seats(seats.clone());

        let root_node = tree.node(root)?;
        let first_prefs = root_node.ledger().first_prefs();
        let vote_pcts = percentages(first_prefs, Some(2));
        let seat_pcts = percentages(&seats, Some(2));
        let mut names: Vec<String> = sorted_desc(&to_tally(first_prefs))
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.extend(seats.keys().filter(|s| !first_prefs.contains_key(*s)).cloned());

        let candidates = names
            .into_iter()
            .map(|name| CandidateResult {
                votes: first_prefs.get(&name).copied().unwrap_or(0),
                vote_percent: vote_pcts.get(&name).copied().unwrap_or(0.0),
                seats: seats.get(&name).copied().unwrap_or(0),
                seat_percent: seat_pcts.get(&name).copied().unwrap_or(0.0),
                name,
            })
            .collect();

        let mut districts = Vec::new();
        for child in root_node.children() {
            let node = tree.node(*child)?;
            districts.push(DistrictResult {
                name: node.name().to_string(),
                ballot_count: node.total_votes(),
                seats: node.seats().clone(),
            });
        }

        let coalition = if file.positions.is_empty() || seats.is_empty() {
            None
        } else {
            Some(most_likely_coalition(&seats, tree.positions())?)
        };

        Ok(ElectionReport {
            info: ReportInfo {
                name: file.name.clone(),
                date: file.date.clone(),
                system: file.system.to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                input_digest,
                tie_break_seed: options.tie_break_seed,
            },
            ballot_count: root_node.total_votes(),
            total_seats: seats.values().sum(),
            candidates,
            districts,
            outcome,
            coalition,
            trace: trace.lines().to_vec(),
        })
    }

    pub fn winner(&self) -> Option<&str> {
        self.outcome.as_ref().map(|o| o.winner.as_str())
    }
}
