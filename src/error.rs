//! Error types for bargain

use thiserror::Error;

/// Main error type for bargain
#[derive(Error, Debug)]
pub enum NegotiationError {
    // Negotiation errors
    #[error("Invalid negotiation state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Round cap exceeded: round {round} of {max_rounds}")]
    RoundCapExceeded { round: u32, max_rounds: u32 },

    #[error("Budget violation: price {price} exceeds budget {budget}")]
    BudgetViolation { price: u64, budget: u64 },

    // Scenario errors
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unknown product preset: {0}")]
    UnknownPreset(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    #[error("Invalid transcript digest: {0}")]
    InvalidDigest(#[from] hex::FromHexError),

    // Batch execution errors
    #[error("Negotiation task failed: {0}")]
    TaskFailed(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bargain operations
pub type Result<T> = std::result::Result<T, NegotiationError>;
