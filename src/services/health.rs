//! Health check endpoints for production monitoring
//!
//! Liveness and readiness checks for process supervision plus a Prometheus
//! metrics endpoint. None of these touch the chain.

use std::sync::Arc;

use alloy::primitives::Address;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::Metrics;

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Component health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall service health response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot_wallet: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub components: Vec<ComponentHealth>,
}

/// What the relayer was able to set up at startup
#[derive(Debug, Clone)]
pub enum RelayerStatus {
    Ready {
        hot_wallet: Address,
        strategy: &'static str,
    },
    /// Configuration failed; claims answer 500 until restart
    Misconfigured { reason: String },
}

/// Shared state for health endpoints
#[derive(Debug)]
pub struct HealthState {
    /// When the server started
    pub started_at: DateTime<Utc>,
    pub relayer: RelayerStatus,
    pub metrics: Arc<Metrics>,
}

impl HealthState {
    pub fn new(relayer: RelayerStatus, metrics: Arc<Metrics>) -> Self {
        Self {
            started_at: Utc::now(),
            relayer,
            metrics,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.relayer, RelayerStatus::Ready { .. })
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }

    /// Get overall health status
    pub fn get_health(&self) -> HealthResponse {
        let (status, component, hot_wallet, strategy) = match &self.relayer {
            RelayerStatus::Ready {
                hot_wallet,
                strategy,
            } => (
                HealthStatus::Healthy,
                ComponentHealth {
                    name: "configuration".to_string(),
                    status: HealthStatus::Healthy,
                    message: None,
                },
                Some(*hot_wallet),
                Some(strategy.to_string()),
            ),
            RelayerStatus::Misconfigured { reason } => (
                HealthStatus::Unhealthy,
                ComponentHealth {
                    name: "configuration".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(reason.clone()),
                },
                None,
                None,
            ),
        };

        HealthResponse {
            status,
            timestamp: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
            hot_wallet,
            strategy,
            components: vec![component],
        }
    }
}

/// Routes for `/health`, `/healthz`, `/readyz` and `/metrics`
pub fn router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Full health check endpoint
async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let health = state.get_health();
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

/// Liveness - is the process alive?
async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness - can claims be served?
async fn readiness_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let up = if state.is_ready() { 1 } else { 0 };

    let body = format!(
        r#"# HELP relayer_up Relayer configured and accepting claims (1) or misconfigured (0)
# TYPE relayer_up gauge
relayer_up {}

# HELP relayer_uptime_seconds Uptime in seconds
# TYPE relayer_uptime_seconds counter
relayer_uptime_seconds {}

{}"#,
        up,
        state.uptime_seconds(),
        state.metrics.prometheus(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_ready_relayer_is_healthy() {
        let state = HealthState::new(
            RelayerStatus::Ready {
                hot_wallet: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                strategy: "token_transfer",
            },
            Arc::new(Metrics::new()),
        );
        let health = state.get_health();

        assert!(state.is_ready());
        assert!(health.status.is_healthy());
        assert_eq!(health.strategy.as_deref(), Some("token_transfer"));
    }

    #[test]
    fn test_misconfigured_relayer_is_unhealthy() {
        let state = HealthState::new(
            RelayerStatus::Misconfigured {
                reason: "missing required configuration variable `chain.rpc_url`".to_string(),
            },
            Arc::new(Metrics::new()),
        );
        let health = state.get_health();

        assert!(!state.is_ready());
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert!(health.hot_wallet.is_none());
        assert!(health.components[0]
            .message
            .as_deref()
            .is_some_and(|m| m.contains("chain.rpc_url")));
    }
}
