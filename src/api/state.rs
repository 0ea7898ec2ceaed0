use std::sync::Arc;

use crate::dispatcher::ClaimDispatcher;
use crate::error::ConfigurationError;
use crate::services::{HealthState, Metrics, RelayerStatus};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// The claim pipeline, or why it could not be built. A misconfigured
    /// relayer still serves requests so callers get a structured 500.
    pub relayer: Result<Arc<ClaimDispatcher>, ConfigurationError>,

    /// Include raw provider payloads in error responses
    pub expose_diagnostics: bool,

    /// Health state and claim counters
    pub health: Arc<HealthState>,
}

impl AppState {
    pub fn new(
        relayer: Result<Arc<ClaimDispatcher>, ConfigurationError>,
        expose_diagnostics: bool,
    ) -> Self {
        let status = match &relayer {
            Ok(dispatcher) => RelayerStatus::Ready {
                hot_wallet: dispatcher.signer_address(),
                strategy: dispatcher.strategy().name(),
            },
            Err(e) => RelayerStatus::Misconfigured {
                reason: e.to_string(),
            },
        };

        Self {
            relayer,
            expose_diagnostics,
            health: Arc::new(HealthState::new(status, Arc::new(Metrics::new()))),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.health.metrics
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.health.uptime_seconds()
    }
}
