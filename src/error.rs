use alloy::primitives::TxHash;
use thiserror::Error;

use crate::chain::ChainFailure;
use crate::domain::SubmittedTransaction;

/// Process-level error type for the relayer service
#[derive(Error, Debug)]
pub enum RelayerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for RelayerError
pub type Result<T> = std::result::Result<T, RelayerError>;

/// Rejected recipient input. Never reaches the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("recipient address field is missing")]
    MissingField,

    #[error("malformed recipient address: {0}")]
    MalformedAddress(String),
}

/// Missing or unusable relayer configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing required configuration variable `{name}`")]
    MissingVariable { name: String },

    #[error("configuration variable `{name}` is malformed: {reason}")]
    Malformed { name: String, reason: String },

    #[error("failed to load configuration sources: {0}")]
    Source(String),
}

impl ConfigurationError {
    pub fn missing(name: &str) -> Self {
        Self::MissingVariable {
            name: name.to_string(),
        }
    }

    pub fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Source(err.to_string())
    }
}

/// Every way a single claim can end without a confirmed transaction.
///
/// Each pipeline stage produces exactly one of these; the API layer is the
/// only place that turns them into wire responses.
#[derive(Error, Debug, Clone)]
pub enum ClaimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("chain connection failed: {0}")]
    ChainConnection(ChainFailure),

    #[error("submission failed: {0}")]
    Submission(ChainFailure),

    /// The signed transaction was sent but the node's answer was lost. It may
    /// or may not be in the mempool.
    #[error("broadcast of {tx_hash} (nonce {nonce}) unacknowledged: {failure}")]
    BroadcastUnknown {
        tx_hash: TxHash,
        nonce: u64,
        failure: ChainFailure,
    },

    /// Mined with a failed receipt
    #[error("transaction {} reverted: {failure}", .transaction.hash)]
    Reverted {
        transaction: SubmittedTransaction,
        failure: ChainFailure,
    },

    /// Broadcast succeeded but inclusion was not observed in time. The
    /// transaction may still be mined.
    #[error("transaction {tx_hash} (nonce {nonce}) not confirmed within {waited_secs}s")]
    ConfirmationTimeout {
        tx_hash: TxHash,
        nonce: u64,
        waited_secs: u64,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClaimError {
    /// Short tag used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "configuration",
            Self::ChainConnection(_) => "chain_connection",
            Self::Submission(_) => "submission",
            Self::BroadcastUnknown { .. } => "broadcast_unknown",
            Self::Reverted { .. } => "reverted",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Internal(_) => "internal",
        }
    }
}
