use thiserror::Error;

pub type BidResult<T> = Result<T, BidError>;

#[derive(Error, Debug)]
pub enum BidError {
    /// Inbound eligibility metadata is missing or wrong-shaped. Callers
    /// degrade to "no eligible agents", never fail the auction request.
    #[error("Malformed bid request: {0}")]
    MalformedRequest(String),

    /// Eligibility data referenced a creative slot the agent does not have.
    /// Skips that single bid; other impressions and agents continue.
    #[error("Creative index {index} out of range for agent '{agent}' ({len} creatives)")]
    IndexOutOfRange {
        agent: String,
        index: usize,
        len: usize,
    },

    #[error("ACS registration failed: {0}")]
    Registration(String),

    #[error("Balance report failed: {0}")]
    Pacing(String),

    /// Malformed or unreadable agents file at startup. Fatal.
    #[error("Configuration error: {0}")]
    ConfigLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
