pub mod api;
pub mod chain;
pub mod claim;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod logging;
pub mod services;
pub mod validation;

pub use config::{RelayerConfig, Settings};
pub use dispatcher::{ClaimDispatcher, ConfirmationPolicy};
pub use error::{ClaimError, RelayerError, Result};
