//! Election simulation engine: single-winner counts, proportional
//! apportionment, hierarchical districts and a spatial voter model.

pub mod apportion;
pub mod coalition;
pub mod config;
pub mod district;
pub mod error;
pub mod ledger;
pub mod report;
pub mod simulation;
pub mod single_winner;
pub mod system;
pub mod tally;
pub mod tiebreak;
pub mod trace;
pub mod util;
pub mod voter;

pub use error::{ElectionError, Result};
pub use ledger::{Ballot, VoteLedger};
pub use system::{count, run, ElectionResult, ElectoralSystem, OutputMode, RunOptions};
pub use tiebreak::TieBreaker;
