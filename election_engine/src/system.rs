//! Electoral system selectors and the dispatcher that runs them.

use crate::apportion::{irv_list_pr, list_pr, ApportionMethod, Quota};
use crate::error::{ElectionError, Result};
use crate::ledger::VoteLedger;
use crate::single_winner::{
    borda, first_past_the_post, instant_runoff, ranked_pairs, sortition, two_round, BordaScoring, Outcome,
};
use crate::tally::{sorted_desc, CandidateId, SeatTally, Tally};
use crate::tiebreak::TieBreaker;
use crate::trace::Trace;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, u32 as decimal};
use nom::combinator::{all_consuming, map, opt, value, verify};
use nom::number::complete::double;
use nom::sequence::{delimited, preceded};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every system the engine can run over a ledger.
///
/// Parsed from and printed as a selector string, e.g. `tworound[3]`,
/// `listpr:highest-averages[2]` or `irv-listpr:dhondt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElectoralSystem {
    Plurality,
    TwoRound { finalists: usize },
    InstantRunoff,
    Borda(BordaScoring),
    RankedPairs,
    /// Random ballot: the first choice of one voter drawn by lot.
    Sortition,
    ListPr(ApportionMethod),
    IrvListPr(ApportionMethod),
}

impl ElectoralSystem {
    /// Whether the system fills more than one seat per count.
    pub fn is_proportional(&self) -> bool {
        matches!(self, ElectoralSystem::ListPr(_) | ElectoralSystem::IrvListPr(_))
    }
}

fn apportion_method(input: &str) -> IResult<&str, ApportionMethod> {
    let quota = alt((value(Quota::Hare, tag("hare")), value(Quota::Droop, tag("droop"))));
    alt((
        map(
            preceded(tag("largest-remainder"), opt(delimited(char('['), quota, char(']')))),
            |quota| ApportionMethod::LargestRemainder {
                quota: quota.unwrap_or(Quota::Hare),
            },
        ),
        map(
            preceded(tag("highest-averages"), opt(delimited(char('['), double, char(']')))),
            |divisor| ApportionMethod::HighestAverages {
                divisor: divisor.unwrap_or(1.0),
            },
        ),
        map(
            preceded(tag("gap-highest-averages"), opt(delimited(char('['), double, char(']')))),
            |factor| ApportionMethod::GapHighestAverages {
                factor: factor.unwrap_or(1.0),
            },
        ),
        value(ApportionMethod::DHONDT, tag("dhondt")),
        value(ApportionMethod::SAINTE_LAGUE, tag("sainte-lague")),
        value(ApportionMethod::HuntingtonHill, tag("huntington-hill")),
    ))(input)
}

fn selector(input: &str) -> IResult<&str, ElectoralSystem> {
    alt((
        value(ElectoralSystem::Plurality, alt((tag("plurality"), tag("fptp")))),
        map(
            preceded(
                alt((tag("tworound"), tag("trs"))),
                opt(delimited(char('['), verify(decimal, |n: &u32| *n > 0), char(']'))),
            ),
            |n| ElectoralSystem::TwoRound {
                finalists: n.map_or(2, |n| n as usize),
            },
        ),
        map(preceded(tag("irv-listpr:"), apportion_method), ElectoralSystem::IrvListPr),
        value(ElectoralSystem::InstantRunoff, tag("irv")),
        map(
            preceded(
                tag("borda"),
                opt(preceded(
                    char(':'),
                    alt((
                        value(BordaScoring::Dowdall, tag("dowdall")),
                        value(BordaScoring::Classic, tag("classic")),
                    )),
                )),
            ),
            |scoring| ElectoralSystem::Borda(scoring.unwrap_or_default()),
        ),
        value(ElectoralSystem::RankedPairs, alt((tag("rankedpairs"), tag("rp")))),
        value(ElectoralSystem::Sortition, alt((tag("sortition"), tag("random-ballot")))),
        map(preceded(tag("listpr:"), apportion_method), ElectoralSystem::ListPr),
        value(
            ElectoralSystem::ListPr(ApportionMethod::HuntingtonHill),
            tag("huntington-hill"),
        ),
    ))(input)
}

impl FromStr for ElectoralSystem {
    type Err = ElectionError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        // The parser borrows `normalized`; it has to drop first.
        let parsed = all_consuming(selector)(normalized.as_str())
            .map(|(_, system)| system)
            .map_err(|_| ElectionError::UnsupportedMethod(s.trim().to_string()));
        parsed
    }
}

impl FromStr for ApportionMethod {
    type Err = ElectionError;

    /// Accepts the method part of a list selector, e.g. `dhondt` or
    /// `largest-remainder[droop]`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let parsed = all_consuming(apportion_method)(normalized.as_str())
            .map(|(_, method)| method)
            .map_err(|_| ElectionError::UnsupportedMethod(s.trim().to_string()));
        parsed
    }
}

impl TryFrom<String> for ElectoralSystem {
    type Error = ElectionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ElectoralSystem> for String {
    fn from(system: ElectoralSystem) -> Self {
        system.to_string()
    }
}

fn method_selector(method: &ApportionMethod) -> String {
    match method {
        ApportionMethod::LargestRemainder { quota: Quota::Hare } => "largest-remainder[hare]".to_string(),
        ApportionMethod::LargestRemainder { quota: Quota::Droop } => "largest-remainder[droop]".to_string(),
        ApportionMethod::HighestAverages { divisor } => format!("highest-averages[{}]", divisor),
        ApportionMethod::GapHighestAverages { factor } => format!("gap-highest-averages[{}]", factor),
        ApportionMethod::HuntingtonHill => "huntington-hill".to_string(),
    }
}

impl fmt::Display for ElectoralSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElectoralSystem::Plurality => write!(f, "plurality"),
            ElectoralSystem::TwoRound { finalists } => write!(f, "tworound[{}]", finalists),
            ElectoralSystem::InstantRunoff => write!(f, "irv"),
            ElectoralSystem::Borda(BordaScoring::Classic) => write!(f, "borda"),
            ElectoralSystem::Borda(BordaScoring::Dowdall) => write!(f, "borda:dowdall"),
            ElectoralSystem::RankedPairs => write!(f, "rankedpairs"),
            ElectoralSystem::Sortition => write!(f, "sortition"),
            ElectoralSystem::ListPr(ApportionMethod::HuntingtonHill) => write!(f, "huntington-hill"),
            ElectoralSystem::ListPr(method) => write!(f, "listpr:{}", method_selector(method)),
            ElectoralSystem::IrvListPr(method) => write!(f, "irv-listpr:{}", method_selector(method)),
        }
    }
}

/// Shape of the value an election run hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// The winner (single-winner systems) or the seat tally (list systems).
    Winner,
    /// The deciding count: final round, Borda scores or list votes.
    FullTally,
    /// Every candidate in finishing order.
    Ranking,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Winner
    }
}

impl FromStr for OutputMode {
    type Err = ElectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "winner" | "seats" => Ok(OutputMode::Winner),
            "full-tally" | "tally" => Ok(OutputMode::FullTally),
            "ranking" => Ok(OutputMode::Ranking),
            other => Err(ElectionError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Per-run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub output_mode: OutputMode,
    /// Fixed seed for tie-breaks; OS entropy when absent.
    #[serde(default)]
    pub tie_break_seed: Option<u64>,
}

impl RunOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            tie_break_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn tiebreaker(&self) -> TieBreaker {
        TieBreaker::from_seed(self.tie_break_seed)
    }

    pub fn trace(&self) -> Trace {
        Trace::new(self.verbose)
    }
}

/// Everything one count produced, before it is reduced to an output mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Count {
    pub seats: SeatTally,
    /// Set by single-winner systems.
    pub outcome: Option<Outcome>,
    pub tally: Tally,
    pub ranking: Vec<CandidateId>,
}

impl Count {
    fn single(outcome: Outcome, tally: Tally, ranking: Option<Vec<CandidateId>>) -> Self {
        let ranking = ranking.unwrap_or_else(|| finishing_order(&tally, &outcome.winner));
        Count {
            seats: outcome.seats(),
            outcome: Some(outcome),
            tally,
            ranking,
        }
    }

    fn seats(seats: SeatTally, tally: Tally) -> Self {
        let ranking = sorted_desc(&tally).into_iter().map(|(party, _)| party).collect();
        Count {
            seats,
            outcome: None,
            tally,
            ranking,
        }
    }

    pub fn into_result(self, mode: OutputMode) -> ElectionResult {
        match (mode, self.outcome) {
            (OutputMode::Winner, Some(outcome)) => ElectionResult::Winner(outcome),
            (OutputMode::Winner, None) => ElectionResult::Seats(self.seats),
            (OutputMode::FullTally, _) => ElectionResult::Tally(self.tally),
            (OutputMode::Ranking, _) => ElectionResult::Ranking(self.ranking),
        }
    }
}

/// Winner first, then the rest of the tally from highest to lowest.
fn finishing_order(tally: &Tally, winner: &str) -> Vec<CandidateId> {
    let mut ranking = vec![winner.to_string()];
    ranking.extend(
        sorted_desc(tally)
            .into_iter()
            .map(|(candidate, _)| candidate)
            .filter(|candidate| candidate != winner),
    );
    ranking
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ElectionResult {
    Winner(Outcome),
    Tally(Tally),
    Ranking(Vec<CandidateId>),
    Seats(SeatTally),
}

impl ElectionResult {
    /// Seats implied by the result, if it carries them.
    pub fn seats(&self) -> Option<SeatTally> {
        match self {
            ElectionResult::Winner(outcome) => Some(outcome.seats()),
            ElectionResult::Seats(seats) => Some(seats.clone()),
            _ => None,
        }
    }
}

/// Runs `system` over `ledger` and keeps every output shape. Single-winner
/// systems fill one seat whatever `seats` says; list systems fill `seats`.
pub fn count(
    ledger: &VoteLedger,
    system: &ElectoralSystem,
    seats: u32,
    tiebreak: &mut TieBreaker,
    trace: &mut Trace,
) -> Result<Count> {
    match system {
        ElectoralSystem::Plurality => {
            let tally = ledger.first_pref_tally();
            let outcome = first_past_the_post(&tally, tiebreak, trace)?;
            Ok(Count::single(outcome, tally, None))
        }
        ElectoralSystem::TwoRound { finalists } => {
            let result = two_round(ledger, *finalists, tiebreak, trace)?;
            let tally = result.second_round.unwrap_or(result.first_round);
            Ok(Count::single(result.outcome, tally, None))
        }
        ElectoralSystem::InstantRunoff => {
            let result = instant_runoff(ledger, tiebreak, trace)?;
            let tally = result.rounds.last().map(|r| r.tally.clone()).unwrap_or_default();
            // Survivors of the last count, then the eliminated in reverse order.
            let mut ranking = finishing_order(&tally, &result.outcome.winner);
            ranking.extend(result.rounds.iter().rev().filter_map(|r| r.eliminated.clone()));
            Ok(Count::single(result.outcome, tally, Some(ranking)))
        }
        ElectoralSystem::Borda(scoring) => {
            let (outcome, scores) = borda(ledger, *scoring, tiebreak, trace)?;
            Ok(Count::single(outcome, scores, None))
        }
        ElectoralSystem::RankedPairs => {
            let result = ranked_pairs(ledger, tiebreak, trace)?;
            let tally = ledger.first_pref_tally();
            Ok(Count::single(result.outcome, tally, Some(result.ranking)))
        }
        ElectoralSystem::Sortition => {
            let outcome = sortition(ledger, tiebreak, trace)?;
            Ok(Count::single(outcome, ledger.first_pref_tally(), None))
        }
        ElectoralSystem::ListPr(method) => {
            let votes = ledger.first_pref_tally();
            let allocation = list_pr(&votes, seats, method, tiebreak, trace)?;
            Ok(Count::seats(allocation, votes))
        }
        ElectoralSystem::IrvListPr(method) => {
            let result = irv_list_pr(ledger, seats, method, tiebreak, trace)?;
            let votes = result
                .stages
                .last()
                .map(|stage| stage.votes.clone())
                .unwrap_or_default();
            Ok(Count::seats(result.seats, votes))
        }
    }
}

/// Runs one election with its own tie-breaker and trace built from `options`.
pub fn run(
    ledger: &VoteLedger,
    system: &ElectoralSystem,
    seats: u32,
    options: &RunOptions,
) -> Result<ElectionResult> {
    let mut tiebreak = options.tiebreaker();
    let mut trace = options.trace();
    let count = count(ledger, system, seats, &mut tiebreak, &mut trace)?;
    Ok(count.into_result(options.output_mode))
}
