//! Claim dispatch pipeline
//!
//! connect → construct → submit → confirm, strictly in order for a single
//! claim. Validation and configuration checks happen before a dispatcher is
//! ever reached.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::chain::{AlloyChainClient, ChainClient, ChainFailure, FailureKind, SubmissionQueue};
use crate::claim::{ClaimStrategy, ContractClaim, TokenTransfer};
use crate::config::{ConfirmationConfig, RelayerConfig, StrategyConfig};
use crate::domain::{CallReceipt, ClaimReceipt, SubmittedTransaction, TxStatus, UnsignedCall};
use crate::error::{ClaimError, ConfigurationError};

/// How long and how often to wait for inclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Blocks required, counting the including block
    pub confirmations: u64,
}

impl From<&ConfirmationConfig> for ConfirmationPolicy {
    fn from(config: &ConfirmationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            confirmations: config.confirmations.max(1),
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::from(&ConfirmationConfig::default())
    }
}

/// Runs claims against one hot wallet with one strategy
pub struct ClaimDispatcher {
    chain: Arc<dyn ChainClient>,
    strategy: Arc<dyn ClaimStrategy>,
    queue: Arc<SubmissionQueue>,
    policy: ConfirmationPolicy,
    min_native_balance: U256,
    /// Detached claims and late-fate watchers, drained on shutdown
    tasks: TaskTracker,
}

impl ClaimDispatcher {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        strategy: Arc<dyn ClaimStrategy>,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            chain,
            strategy,
            queue: Arc::new(SubmissionQueue::new()),
            policy,
            min_native_balance: U256::ZERO,
            tasks: TaskTracker::new(),
        }
    }

    /// Refuse to broadcast while the hot wallet holds less than `wei`
    pub fn with_min_native_balance(mut self, wei: U256) -> Self {
        self.min_native_balance = wei;
        self
    }

    /// Build the production dispatcher from resolved configuration.
    ///
    /// Does not touch the network.
    pub fn from_config(config: &RelayerConfig) -> Result<Self, ConfigurationError> {
        let chain = AlloyChainClient::connect(
            config.rpc_url.clone(),
            &config.signing_key,
            config.chain_id,
        )?;

        Ok(Self::new(
            Arc::new(chain),
            strategy_for(&config.strategy),
            ConfirmationPolicy::from(&config.confirmation),
        )
        .with_min_native_balance(config.min_native_balance))
    }

    pub fn signer_address(&self) -> Address {
        self.chain.signer_address()
    }

    pub fn strategy(&self) -> &dyn ClaimStrategy {
        self.strategy.as_ref()
    }

    /// Run one claim to a terminal outcome
    #[instrument(skip(self), fields(strategy = self.strategy.name()))]
    pub async fn dispatch(&self, recipient: Address) -> Result<ClaimReceipt, ClaimError> {
        let signer = self.chain.signer_address();

        // Connectivity check; also the balance we log for operators
        let balance = self
            .chain
            .native_balance()
            .await
            .map_err(ClaimError::ChainConnection)?;
        info!("Relayer wallet {} balance: {} wei", signer, balance);

        if balance < self.min_native_balance {
            warn!(
                "Relayer wallet {} below minimum balance ({} < {} wei), not broadcasting",
                signer, balance, self.min_native_balance
            );
            return Err(ClaimError::Submission(ChainFailure::insufficient_funds(
                format!(
                    "hot wallet balance {} wei is below the configured minimum of {} wei",
                    balance, self.min_native_balance
                ),
            )));
        }

        let call = self.strategy.build_call(recipient);
        info!("Sending {} via {}", call.description, call.to);

        let tx = match self.queue.submit(self.chain.as_ref(), &call).await {
            Ok(tx) => tx,
            Err(ClaimError::BroadcastUnknown {
                tx_hash,
                nonce,
                failure,
            }) => {
                // The node may hold the transaction; track it like a timeout
                self.queue.invalidate(signer).await;
                self.watch_pending(SubmittedTransaction::pending(tx_hash, nonce), call);
                return Err(ClaimError::BroadcastUnknown {
                    tx_hash,
                    nonce,
                    failure,
                });
            }
            Err(e) => return Err(e),
        };
        info!("Waiting for tx confirmation: {} (nonce {})", tx.hash, tx.nonce);

        let waited = timeout(
            self.policy.timeout,
            wait_for_receipt(self.chain.as_ref(), tx.hash, &self.policy),
        )
        .await;

        match waited {
            Ok(receipt) if receipt.success => {
                info!(
                    "Confirmed {} in block {} (gas used {})",
                    receipt.tx_hash, receipt.block_number, receipt.gas_used
                );
                Ok(ClaimReceipt {
                    recipient,
                    transaction: tx.with_status(TxStatus::Confirmed),
                    block_number: receipt.block_number,
                    message: self.strategy.success_message(recipient),
                })
            }
            Ok(receipt) => {
                let failure = revert_failure(self.chain.as_ref(), &call, &receipt).await;
                warn!("Transaction {} reverted: {}", tx.hash, failure);
                Err(ClaimError::Reverted {
                    transaction: tx.with_status(TxStatus::Failed),
                    failure,
                })
            }
            Err(_) => {
                warn!(
                    "Transaction {} not confirmed within {:?}; it may still be mined",
                    tx.hash, self.policy.timeout
                );
                // Successors must not queue up behind a nonce that may never land
                self.queue.invalidate(signer).await;
                self.watch_pending(tx, call);
                Err(ClaimError::ConfirmationTimeout {
                    tx_hash: tx.hash,
                    nonce: tx.nonce,
                    waited_secs: self.policy.timeout.as_secs(),
                })
            }
        }
    }

    /// Run [`dispatch`](Self::dispatch) on its own task.
    ///
    /// A dropped caller cannot cancel the claim part-way through a
    /// broadcast; the outcome is logged either way.
    pub async fn dispatch_detached(
        self: &Arc<Self>,
        recipient: Address,
    ) -> Result<ClaimReceipt, ClaimError> {
        let dispatcher = Arc::clone(self);
        let handle = self.tasks.spawn(async move {
            let outcome = dispatcher.dispatch(recipient).await;
            match &outcome {
                Ok(receipt) => info!(
                    "Claim for {} confirmed: {}",
                    recipient, receipt.transaction.hash
                ),
                Err(e) => warn!("Claim for {} ended with {} error: {}", recipient, e.kind(), e),
            }
            outcome
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Claim task for {} aborted: {}", recipient, e);
                Err(ClaimError::Internal(format!("claim task aborted: {e}")))
            }
        }
    }

    /// Wait up to `limit` for detached claims and late-fate watchers.
    ///
    /// Returns `false` if some were still running when the limit passed.
    pub async fn drain_background(&self, limit: Duration) -> bool {
        self.tasks.close();
        let running = self.tasks.len();
        if running > 0 {
            info!("Waiting up to {:?} for {} background claim task(s)", limit, running);
        }
        match timeout(limit, self.tasks.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "{} background claim task(s) still running after {:?}; their outcome will not be logged",
                    self.tasks.len(),
                    limit
                );
                false
            }
        }
    }

    /// Background tasks still running
    pub fn background_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Keep polling a transaction of unknown fate for one more window and log
    /// how it ends. Nothing is retried or persisted.
    fn watch_pending(&self, tx: SubmittedTransaction, call: UnsignedCall) {
        let chain = Arc::clone(&self.chain);
        let policy = self.policy;

        self.tasks.spawn(async move {
            match timeout(policy.timeout, wait_for_receipt(chain.as_ref(), tx.hash, &policy)).await
            {
                Ok(receipt) if receipt.success => info!(
                    "Late confirmation: {} (nonce {}) mined in block {}",
                    tx.hash, tx.nonce, receipt.block_number
                ),
                Ok(receipt) => {
                    let failure = revert_failure(chain.as_ref(), &call, &receipt).await;
                    warn!("Late revert: {} (nonce {}): {}", tx.hash, tx.nonce, failure);
                }
                Err(_) => error!(
                    "Transaction {} (nonce {}) not mined within a further {:?}; check it manually",
                    tx.hash, tx.nonce, policy.timeout
                ),
            }
        });
    }
}

impl std::fmt::Debug for ClaimDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimDispatcher")
            .field("signer", &self.chain.signer_address())
            .field("strategy", &self.strategy)
            .field("policy", &self.policy)
            .field("min_native_balance", &self.min_native_balance)
            .field("background_tasks", &self.tasks.len())
            .finish()
    }
}

/// Strategy for a resolved deployment mode
pub fn strategy_for(config: &StrategyConfig) -> Arc<dyn ClaimStrategy> {
    match config {
        StrategyConfig::TokenTransfer {
            token,
            amount,
            base_units,
            ..
        } => Arc::new(TokenTransfer::new(*token, *base_units, amount.clone())),
        StrategyConfig::ContractClaim { contract } => Arc::new(ContractClaim::new(*contract)),
    }
}

/// Poll until `hash` has a receipt with enough confirmations.
///
/// Never returns on its own if the transaction is never mined; callers bound
/// it with a timeout. RPC errors while polling are logged and polling goes on.
async fn wait_for_receipt(
    chain: &dyn ChainClient,
    hash: TxHash,
    policy: &ConfirmationPolicy,
) -> CallReceipt {
    let mut tick = tokio::time::interval(policy.poll_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tick.tick().await;

        let receipt = match chain.receipt(hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                debug!("{} not yet included", hash);
                continue;
            }
            Err(failure) => {
                warn!("Receipt lookup for {} failed: {}", hash, failure);
                continue;
            }
        };

        // A revert is final once included
        if !receipt.success || policy.confirmations <= 1 {
            return receipt;
        }

        match chain.block_number().await {
            Ok(head) if head.saturating_sub(receipt.block_number) + 1 >= policy.confirmations => {
                return receipt;
            }
            Ok(head) => debug!(
                "{} included in block {}, head {} ({} confirmations required)",
                hash, receipt.block_number, head, policy.confirmations
            ),
            Err(failure) => warn!("Block number lookup failed: {}", failure),
        }
    }
}

async fn revert_failure(
    chain: &dyn ChainClient,
    call: &UnsignedCall,
    receipt: &CallReceipt,
) -> ChainFailure {
    match chain.replay_revert(call, receipt.block_number).await {
        Some(mut failure) => {
            failure.kind = FailureKind::Reverted;
            failure
        }
        None => ChainFailure::reverted(
            format!(
                "transaction {} reverted in block {}",
                receipt.tx_hash, receipt.block_number
            ),
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainClient;
    use crate::domain::SignedCall;
    use alloy::primitives::{address, Bytes, B256};
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const SIGNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const TOKEN: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    fn fast_policy() -> ConfirmationPolicy {
        ConfirmationPolicy {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(5),
            confirmations: 1,
        }
    }

    fn token_strategy() -> Arc<dyn ClaimStrategy> {
        Arc::new(TokenTransfer::new(TOKEN, U256::from(10u64), "10"))
    }

    fn hash_for(nonce: u64) -> TxHash {
        B256::left_padding_from(&nonce.to_be_bytes())
    }

    fn signed(nonce: u64) -> SignedCall {
        SignedCall {
            hash: hash_for(nonce),
            nonce,
            raw: Bytes::from(nonce.to_be_bytes().to_vec()),
        }
    }

    fn receipt(hash: TxHash, success: bool) -> CallReceipt {
        CallReceipt {
            tx_hash: hash,
            block_number: 100,
            success,
            gas_used: 51_000,
        }
    }

    fn funded_chain() -> MockChainClient {
        let mut chain = MockChainClient::new();
        chain.expect_signer_address().return_const(SIGNER);
        chain
            .expect_native_balance()
            .returning(|| Ok(U256::from(10u64).pow(U256::from(18u64))));
        chain
    }

    /// Funded chain that signs and accepts every broadcast
    fn accepting_chain() -> MockChainClient {
        let mut chain = funded_chain();
        chain.expect_sign_call().returning(|_, nonce| Ok(signed(nonce)));
        chain.expect_broadcast().returning(|_| Ok(()));
        chain
    }

    #[tokio::test]
    async fn test_dispatch_confirms_transfer() {
        let mut chain = funded_chain();
        chain.expect_pending_nonce().times(1).returning(|| Ok(0));
        chain
            .expect_sign_call()
            .withf(|call, nonce| call.to == TOKEN && *nonce == 0)
            .times(1)
            .returning(|_, nonce| Ok(signed(nonce)));
        chain
            .expect_broadcast()
            .with(eq(signed(0)))
            .times(1)
            .returning(|_| Ok(()));
        chain
            .expect_receipt()
            .with(eq(hash_for(0)))
            .returning(|hash| Ok(Some(receipt(hash, true))));

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy());
        let claim = dispatcher.dispatch(RECIPIENT).await.unwrap();

        assert_eq!(claim.transaction.hash, hash_for(0));
        assert_eq!(claim.transaction.status, TxStatus::Confirmed);
        assert_eq!(claim.block_number, 100);
        assert_eq!(
            claim.message,
            format!("Tokens sent successfully to {RECIPIENT}")
        );
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let mut chain = MockChainClient::new();
        chain.expect_signer_address().return_const(SIGNER);
        chain
            .expect_native_balance()
            .returning(|| Err(ChainFailure::network("connection refused")));
        chain.expect_pending_nonce().times(0);
        chain.expect_sign_call().times(0);
        chain.expect_broadcast().times(0);

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy());
        let err = dispatcher.dispatch(RECIPIENT).await.unwrap_err();
        assert!(matches!(err, ClaimError::ChainConnection(ref f) if f.kind == FailureKind::Network));
    }

    #[tokio::test]
    async fn test_underfunded_wallet_never_broadcasts() {
        let mut chain = MockChainClient::new();
        chain.expect_signer_address().return_const(SIGNER);
        chain.expect_native_balance().returning(|| Ok(U256::from(5u64)));
        chain.expect_sign_call().times(0);
        chain.expect_broadcast().times(0);

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy())
            .with_min_native_balance(U256::from(1_000u64));

        match dispatcher.dispatch(RECIPIENT).await {
            Err(ClaimError::Submission(failure)) => {
                assert_eq!(failure.code(), "INSUFFICIENT_FUNDS")
            }
            other => panic!("expected submission error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_receipt_replays_revert_reason() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(4));
        chain
            .expect_receipt()
            .returning(|hash| Ok(Some(receipt(hash, false))));
        chain
            .expect_replay_revert()
            .withf(|_, block| *block == 100)
            .times(1)
            .returning(|_, _| {
                Some(ChainFailure::from_rpc(
                    3,
                    "execution reverted: Already claimed",
                    None,
                    false,
                    None,
                ))
            });

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy());
        match dispatcher.dispatch(RECIPIENT).await {
            Err(ClaimError::Reverted {
                transaction,
                failure,
            }) => {
                assert_eq!(transaction.hash, hash_for(4));
                assert_eq!(transaction.nonce, 4);
                assert_eq!(transaction.status, TxStatus::Failed);
                assert_eq!(failure.kind, FailureKind::Reverted);
                assert_eq!(failure.reason.as_deref(), Some("Already claimed"));
            }
            other => panic!("expected revert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transient_receipt_errors_keep_polling() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(1));

        let mut seq = mockall::Sequence::new();
        chain
            .expect_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ChainFailure::network("timed out")));
        chain
            .expect_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        chain
            .expect_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(Some(receipt(hash, true))));

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy());
        let claim = dispatcher.dispatch(RECIPIENT).await.unwrap();
        assert_eq!(claim.transaction.nonce, 1);
    }

    #[tokio::test]
    async fn test_waits_for_required_confirmations() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(0));
        chain
            .expect_receipt()
            .returning(|hash| Ok(Some(receipt(hash, true))));

        let mut seq = mockall::Sequence::new();
        chain
            .expect_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(100));
        chain
            .expect_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(102));

        let policy = ConfirmationPolicy {
            confirmations: 3,
            ..fast_policy()
        };
        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), policy);
        let claim = dispatcher.dispatch(RECIPIENT).await.unwrap();
        assert_eq!(claim.block_number, 100);
    }

    #[tokio::test]
    async fn test_timeout_reports_pending_hash() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(9));
        chain.expect_receipt().returning(|_| Ok(None));

        let policy = ConfirmationPolicy {
            timeout: Duration::from_millis(30),
            ..fast_policy()
        };
        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), policy);

        match dispatcher.dispatch(RECIPIENT).await {
            Err(ClaimError::ConfirmationTimeout { tx_hash, nonce, .. }) => {
                assert_eq!(tx_hash, hash_for(9));
                assert_eq!(nonce, 9);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unmined_transaction_does_not_strand_later_nonces() {
        // Nothing is ever mined, so the node keeps reporting nonce 0 as next
        let signed_nonces = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&signed_nonces);

        let mut chain = funded_chain();
        chain.expect_pending_nonce().times(3).returning(|| Ok(0));
        chain.expect_sign_call().returning(move |_, nonce| {
            seen.lock().unwrap().push(nonce);
            Ok(signed(nonce))
        });
        chain.expect_broadcast().returning(|_| Ok(()));
        chain.expect_receipt().returning(|_| Ok(None));

        let policy = ConfirmationPolicy {
            timeout: Duration::from_millis(30),
            ..fast_policy()
        };
        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), policy);

        for _ in 0..3 {
            let err = dispatcher.dispatch(RECIPIENT).await.unwrap_err();
            assert!(matches!(err, ClaimError::ConfirmationTimeout { nonce: 0, .. }));
        }

        assert_eq!(*signed_nonces.lock().unwrap(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_lost_broadcast_is_tracked_by_hash() {
        let mined = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&mined);

        let mut chain = funded_chain();
        chain.expect_pending_nonce().times(1).returning(|| Ok(6));
        chain.expect_sign_call().returning(|_, nonce| Ok(signed(nonce)));
        chain
            .expect_broadcast()
            .times(1)
            .returning(|_| Err(ChainFailure::network("connection reset by peer")));
        chain.expect_receipt().returning(move |hash| {
            Ok(flag
                .load(Ordering::SeqCst)
                .then(|| receipt(hash, true)))
        });

        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), fast_policy());

        match dispatcher.dispatch(RECIPIENT).await {
            Err(ClaimError::BroadcastUnknown {
                tx_hash,
                nonce,
                failure,
            }) => {
                assert_eq!(tx_hash, hash_for(6));
                assert_eq!(nonce, 6);
                assert_eq!(failure.code(), "NETWORK_ERROR");
            }
            other => panic!("expected unknown broadcast, got {other:?}"),
        }
        assert_eq!(dispatcher.background_tasks(), 1);
        assert_eq!(dispatcher.queue.cached_nonce(SIGNER).await, None);

        // The node did accept it after all; the watcher sees it land
        mined.store(true, Ordering::SeqCst);
        assert!(dispatcher.drain_background(Duration::from_secs(2)).await);
        assert_eq!(dispatcher.background_tasks(), 0);
    }

    #[tokio::test]
    async fn test_drain_waits_for_watchers() {
        let mined = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&mined);

        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(3));
        chain.expect_receipt().returning(move |hash| {
            Ok(flag
                .load(Ordering::SeqCst)
                .then(|| receipt(hash, true)))
        });

        let policy = ConfirmationPolicy {
            timeout: Duration::from_millis(30),
            ..fast_policy()
        };
        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), policy);

        let err = dispatcher.dispatch(RECIPIENT).await.unwrap_err();
        assert!(matches!(err, ClaimError::ConfirmationTimeout { .. }));
        assert_eq!(dispatcher.background_tasks(), 1);

        mined.store(true, Ordering::SeqCst);
        assert!(dispatcher.drain_background(Duration::from_secs(2)).await);
        assert_eq!(dispatcher.background_tasks(), 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_limit() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(3));
        chain.expect_receipt().returning(|_| Ok(None));

        let policy = ConfirmationPolicy {
            timeout: Duration::from_millis(50),
            ..fast_policy()
        };
        let dispatcher = ClaimDispatcher::new(Arc::new(chain), token_strategy(), policy);

        dispatcher.dispatch(RECIPIENT).await.unwrap_err();
        // The watcher polls for another 50ms; the drain allows 1ms
        assert!(!dispatcher.drain_background(Duration::from_millis(1)).await);
        assert_eq!(dispatcher.background_tasks(), 1);
    }

    #[tokio::test]
    async fn test_detached_dispatch_returns_outcome() {
        let mut chain = accepting_chain();
        chain.expect_pending_nonce().returning(|| Ok(2));
        chain
            .expect_receipt()
            .returning(|hash| Ok(Some(receipt(hash, true))));

        let dispatcher = Arc::new(ClaimDispatcher::new(
            Arc::new(chain),
            Arc::new(ContractClaim::new(TOKEN)),
            fast_policy(),
        ));
        let claim = dispatcher.dispatch_detached(RECIPIENT).await.unwrap();
        assert_eq!(claim.message, format!("Claim successful for {RECIPIENT}"));
        assert!(dispatcher.drain_background(Duration::from_millis(100)).await);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = ConfirmationPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.poll_interval, Duration::from_millis(1000));
        assert_eq!(policy.confirmations, 1);
    }
}
