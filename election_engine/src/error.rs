#[derive(Debug, thiserror::Error)]
pub enum ElectionError {
    #[error("No candidates to choose from")]
    NoCandidates,
    #[error("No votes have been cast")]
    NoVotes,
    #[error("Invalid seat count: {0} (must be at least 1)")]
    InvalidSeatCount(i64),
    #[error("Invalid finalist count: {0} (must be at least 1)")]
    InvalidFinalists(usize),
    #[error("Invalid divisor interval: {0} (must be non-negative)")]
    InvalidDivisor(f64),
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
    #[error("Unknown district node: {0}")]
    UnknownDistrict(usize),
    #[error("Candidate ranked more than once: {0}")]
    DuplicateRanking(String),
    #[error("No position for party: {0}")]
    MissingPosition(String),
    #[error("Invalid vote spread: {0}")]
    InvalidSpread(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ElectionError>;
