//! Subscriber setup and call-scoped logging helpers.
//!
//! JSON lines carry consistent fields for log shipping:
//! - `timestamp`, `level`, `target`
//! - `code`: correlation code of the call, when there is one
//! - `function`: remote function reference
//! - `message`

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Filter(e.to_string()))
}

/// Install the global subscriber.
pub(crate) fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    // JSON output for containers, pretty output for development
    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

/// Span covering one bridged call.
///
/// ```rust,ignore
/// let _span = call_span!(handle.code(), "calc.add").entered();
/// ```
#[macro_export]
macro_rules! call_span {
    ($code:expr, $function:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info_span!(
            "script_call",
            code = %$code,
            function = %$function
            $(, $($field)*)?
        )
    };
}

/// Log an event about one bridged call with the standard fields.
///
/// ```rust,ignore
/// log_call_event!(warn, code, "calc.add", "Script function threw", message = %msg);
/// ```
#[macro_export]
macro_rules! log_call_event {
    ($level:ident, $code:expr, $function:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            code = %$code,
            function = %$function,
            $($($field)*,)?
            $msg
        )
    };
}
