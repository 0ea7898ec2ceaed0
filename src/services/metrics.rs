use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::error::ClaimError;

/// Claim counters for observability
#[derive(Debug, Default)]
pub struct Metrics {
    /// Claim requests that reached the handler
    pub claims_received: AtomicU64,
    /// Claims confirmed on-chain
    pub claims_succeeded: AtomicU64,
    /// Requests rejected by validation
    pub claims_rejected: AtomicU64,
    /// Configuration, connection and submission failures
    pub claims_failed: AtomicU64,
    /// Broadcast but unconfirmed when the wait ran out
    pub claims_pending: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_received(&self) {
        self.claims_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_succeeded(&self) {
        self.claims_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a terminal claim error under its outcome
    pub fn record_error(&self, err: &ClaimError) {
        let counter = match err {
            ClaimError::Validation(_) => &self.claims_rejected,
            ClaimError::ConfirmationTimeout { .. } | ClaimError::BroadcastUnknown { .. } => {
                &self.claims_pending
            }
            ClaimError::Configuration(_)
            | ClaimError::ChainConnection(_)
            | ClaimError::Submission(_)
            | ClaimError::Reverted { .. }
            | ClaimError::Internal(_) => &self.claims_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> String {
        format!(
            "claims received={} succeeded={} rejected={} failed={} pending={}",
            self.claims_received.load(Ordering::Relaxed),
            self.claims_succeeded.load(Ordering::Relaxed),
            self.claims_rejected.load(Ordering::Relaxed),
            self.claims_failed.load(Ordering::Relaxed),
            self.claims_pending.load(Ordering::Relaxed),
        )
    }

    /// Export counters in Prometheus text format
    pub fn prometheus(&self) -> String {
        format!(
            r#"# HELP relayer_claims_received_total Claim requests received
# TYPE relayer_claims_received_total counter
relayer_claims_received_total {}

# HELP relayer_claims_succeeded_total Claims confirmed on-chain
# TYPE relayer_claims_succeeded_total counter
relayer_claims_succeeded_total {}

# HELP relayer_claims_rejected_total Claims rejected by input validation
# TYPE relayer_claims_rejected_total counter
relayer_claims_rejected_total {}

# HELP relayer_claims_failed_total Claims failed on configuration, connection or submission
# TYPE relayer_claims_failed_total counter
relayer_claims_failed_total {}

# HELP relayer_claims_pending_total Claims broadcast but not confirmed in time
# TYPE relayer_claims_pending_total counter
relayer_claims_pending_total {}
"#,
            self.claims_received.load(Ordering::Relaxed),
            self.claims_succeeded.load(Ordering::Relaxed),
            self.claims_rejected.load(Ordering::Relaxed),
            self.claims_failed.load(Ordering::Relaxed),
            self.claims_pending.load(Ordering::Relaxed),
        )
    }

    /// Log the counters at shutdown
    pub fn log_status(&self) {
        info!("{}", self.summary());
    }
}
