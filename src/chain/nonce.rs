//! Serialized nonce assignment for shared signers
//!
//! Every claim signs with the same hot wallet, so two claims broadcast
//! concurrently would otherwise read the same pending nonce. Each signer gets
//! one lane: a FIFO mutex around "pick nonce, sign, broadcast". Confirmation
//! waits happen outside the lane.

use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::chain::{ChainClient, FailureKind};
use crate::domain::{SubmittedTransaction, UnsignedCall};
use crate::error::ClaimError;

#[derive(Debug, Default)]
struct NonceLane {
    /// Next nonce to hand out; `None` until read from the chain or after a
    /// failed broadcast
    next: Option<u64>,
}

/// Single-writer submission queue keyed by signer address
///
/// # Example
/// ```rust,ignore
/// let queue = SubmissionQueue::new();
/// let tx = queue.submit(chain.as_ref(), &call).await?;
/// // tx.nonce is unique and increasing for chain.signer_address()
/// ```
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    lanes: DashMap<Address, Arc<Mutex<NonceLane>>>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a nonce, sign and broadcast `call`, holding the signer's lane
    /// for the whole critical section.
    ///
    /// The lane is a fair mutex, so submission order equals arrival order.
    /// Any failure clears the cached nonce so the next submission re-reads
    /// the pending nonce from the chain. Nothing is resubmitted here.
    ///
    /// A transport failure during broadcast yields
    /// [`ClaimError::BroadcastUnknown`] with the signed hash: the node may
    /// have accepted the transaction before the connection dropped.
    pub async fn submit(
        &self,
        chain: &dyn ChainClient,
        call: &UnsignedCall,
    ) -> Result<SubmittedTransaction, ClaimError> {
        let signer = chain.signer_address();
        let lane = self.lanes.entry(signer).or_default().clone();
        let mut lane = lane.lock().await;

        let nonce = match lane.next {
            Some(nonce) => nonce,
            None => {
                let nonce = chain
                    .pending_nonce()
                    .await
                    .map_err(ClaimError::ChainConnection)?;
                debug!("Loaded pending nonce {} for {}", nonce, signer);
                nonce
            }
        };

        let signed = match chain.sign_call(call, nonce).await {
            Ok(signed) => signed,
            Err(failure) => {
                lane.next = None;
                warn!(
                    "Signing {} from {} with nonce {} failed: {}",
                    call.description, signer, nonce, failure
                );
                return Err(match failure.kind {
                    FailureKind::Network => ClaimError::ChainConnection(failure),
                    _ => ClaimError::Submission(failure),
                });
            }
        };

        match chain.broadcast(&signed).await {
            Ok(()) => {
                lane.next = Some(nonce + 1);
                debug!("Broadcast {} from {} with nonce {}", signed.hash, signer, nonce);
                Ok(SubmittedTransaction::pending(signed.hash, nonce))
            }
            Err(failure) if failure.kind == FailureKind::Network => {
                lane.next = None;
                warn!(
                    "Broadcast of {} from {} with nonce {} unacknowledged: {}",
                    signed.hash, signer, nonce, failure
                );
                Err(ClaimError::BroadcastUnknown {
                    tx_hash: signed.hash,
                    nonce,
                    failure,
                })
            }
            Err(failure) => {
                lane.next = None;
                warn!(
                    "Broadcast from {} with nonce {} rejected: {}",
                    signer, nonce, failure
                );
                Err(ClaimError::Submission(failure))
            }
        }
    }

    /// Drop the cached nonce for `signer`.
    ///
    /// Called when a broadcast transaction's fate is unknown. If it never
    /// lands, a cached successor nonce would leave every later transaction
    /// stuck behind the gap; re-reading the pending nonce reuses it instead.
    pub async fn invalidate(&self, signer: Address) {
        let Some(lane) = self.lanes.get(&signer).map(|lane| lane.clone()) else {
            return;
        };
        let mut lane = lane.lock().await;
        if let Some(next) = lane.next.take() {
            debug!("Dropped cached nonce {} for {}", next, signer);
        }
    }

    /// Nonce the next submission for `signer` would use, if cached
    pub async fn cached_nonce(&self, signer: Address) -> Option<u64> {
        let lane = self.lanes.get(&signer)?.clone();
        let next = lane.lock().await.next;
        next
    }
}
