pub mod health;
pub mod metrics;

pub use health::{ComponentHealth, HealthResponse, HealthState, HealthStatus, RelayerStatus};
pub use metrics::Metrics;
