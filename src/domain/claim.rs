use alloy::primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// A validated claim request. Only the recipient survives validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    pub recipient: Address,
}

/// Unsigned call descriptor produced by a claim strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCall {
    /// Contract the call is sent to
    pub to: Address,
    /// ABI-encoded calldata
    pub data: Bytes,
    /// Human readable summary for logs, e.g. `transfer(0xabc.., 10000)`
    pub description: String,
}

/// A call signed by the hot wallet, not yet broadcast.
///
/// The hash is final once signed, so a broadcast whose response is lost can
/// still be tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub hash: TxHash,
    pub nonce: u64,
    /// EIP-2718 encoded envelope
    pub raw: Bytes,
}

/// Lifecycle of a broadcast transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Broadcast, inclusion not observed yet
    Pending,
    /// Included with a successful receipt
    Confirmed,
    /// Included but reverted
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Confirmed => write!(f, "confirmed"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A transaction this process broadcast from the hot wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub nonce: u64,
    pub status: TxStatus,
}

impl SubmittedTransaction {
    pub fn pending(hash: TxHash, nonce: u64) -> Self {
        Self {
            hash,
            nonce,
            status: TxStatus::Pending,
        }
    }

    pub fn with_status(self, status: TxStatus) -> Self {
        Self { status, ..self }
    }
}

/// Receipt fields the relayer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub gas_used: u64,
}

/// Outcome of a claim that reached confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub recipient: Address,
    pub transaction: SubmittedTransaction,
    pub block_number: u64,
    pub message: String,
}
