//! # Script Bridge Telemetry
//!
//! Structured logging for the script bridge workspace, built on `tracing`
//! and `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sb_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SB_SERVICE_NAME` | `script-bridge` | Service name on every log line |
//! | `SB_LOG_LEVEL` | `info` | Log filter (`RUST_LOG` also honored) |
//! | `SB_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `SB_JSON_LOGS` | `false` | JSON lines instead of pretty output |

#![allow(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global tracing subscriber.
///
/// Returns a guard to hold for the lifetime of the application. Fails if a
/// global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
