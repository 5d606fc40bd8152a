//! Bridge configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use sb_call_bridge::domain::BridgeConfigBuilder;
//!
//! let config = BridgeConfigBuilder::new()
//!     .code_length(6)
//!     .call_timeout(Duration::from_secs(30))
//!     .build()
//!     .expect("Valid config");
//! ```

use crate::error::BridgeError;
use std::env;
use std::time::Duration;

/// Call bridge configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Digits per correlation code
    pub code_length: usize,
    /// Characters per bridge target id
    pub target_id_length: usize,
    /// Regeneration attempts when a fresh code collides with a pending one
    pub max_code_attempts: u32,
    /// Expire calls that stay pending longer than this (`None` = never)
    pub call_timeout: Option<Duration>,
    /// How often the sweep task looks for expired calls
    pub sweep_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            code_length: 5,
            target_id_length: 5,
            max_code_attempts: 8,
            call_timeout: None,
            sweep_interval: Duration::from_secs(1),
        }
    }
}

impl BridgeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SB_CODE_LENGTH`: digits per correlation code (default: 5)
    /// - `SB_TARGET_ID_LENGTH`: characters per target id (default: 5)
    /// - `SB_MAX_CODE_ATTEMPTS`: collision retries (default: 8)
    /// - `SB_CALL_TIMEOUT_MS`: pending call timeout, unset or 0 = none
    /// - `SB_SWEEP_INTERVAL_MS`: expiry sweep interval (default: 1000)
    pub fn from_env() -> Result<Self, BridgeError> {
        let defaults = Self::default();

        let config = Self {
            code_length: env_parse("SB_CODE_LENGTH")?.unwrap_or(defaults.code_length),
            target_id_length: env_parse("SB_TARGET_ID_LENGTH")?
                .unwrap_or(defaults.target_id_length),
            max_code_attempts: env_parse("SB_MAX_CODE_ATTEMPTS")?
                .unwrap_or(defaults.max_code_attempts),
            call_timeout: env_parse::<u64>("SB_CALL_TIMEOUT_MS")?
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            sweep_interval: env_parse::<u64>("SB_SWEEP_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), BridgeError> {
        // Below 4 digits a busy bridge collides constantly; above 18 the code
        // no longer fits a u64 on the script side.
        if !(4..=18).contains(&self.code_length) {
            return Err(BridgeError::Config(format!(
                "code_length must be between 4 and 18, got {}",
                self.code_length
            )));
        }

        if !(4..=32).contains(&self.target_id_length) {
            return Err(BridgeError::Config(format!(
                "target_id_length must be between 4 and 32, got {}",
                self.target_id_length
            )));
        }

        if self.max_code_attempts == 0 {
            return Err(BridgeError::Config(
                "max_code_attempts cannot be 0".to_string(),
            ));
        }

        if self.sweep_interval.is_zero() {
            return Err(BridgeError::Config(
                "sweep_interval cannot be 0".to_string(),
            ));
        }

        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BridgeError::Config(
                "call_timeout cannot be 0 (use None to disable)".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, BridgeError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BridgeError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Builder for BridgeConfig with validation
#[derive(Default)]
pub struct BridgeConfigBuilder {
    code_length: Option<usize>,
    target_id_length: Option<usize>,
    max_code_attempts: Option<u32>,
    call_timeout: Option<Duration>,
    sweep_interval: Option<Duration>,
}

impl BridgeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code_length(mut self, digits: usize) -> Self {
        self.code_length = Some(digits);
        self
    }

    pub fn target_id_length(mut self, chars: usize) -> Self {
        self.target_id_length = Some(chars);
        self
    }

    pub fn max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = Some(attempts);
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Build the BridgeConfig, validating all parameters
    pub fn build(self) -> Result<BridgeConfig, BridgeError> {
        let defaults = BridgeConfig::default();

        let config = BridgeConfig {
            code_length: self.code_length.unwrap_or(defaults.code_length),
            target_id_length: self.target_id_length.unwrap_or(defaults.target_id_length),
            max_code_attempts: self.max_code_attempts.unwrap_or(defaults.max_code_attempts),
            call_timeout: self.call_timeout.or(defaults.call_timeout),
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
        };

        config.validate()?;
        Ok(config)
    }
}
