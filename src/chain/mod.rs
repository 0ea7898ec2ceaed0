//! Chain access for the hot wallet
//!
//! [`ChainClient`] is the seam between the claim pipeline and the RPC node.
//! [`AlloyChainClient`] is the production implementation; tests substitute
//! mocks. Nonce assignment goes through [`SubmissionQueue`] so concurrent
//! claims never race on the shared signer.

pub mod alloy_client;
pub mod client;
pub mod errors;
pub mod nonce;

pub use alloy_client::AlloyChainClient;
pub use client::ChainClient;
pub use errors::{ChainFailure, FailureKind};
pub use nonce::SubmissionQueue;

#[cfg(test)]
pub use client::MockChainClient;
