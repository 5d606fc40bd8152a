//! Inbound Ports (Driving Ports)
//!
//! The narrow callback channel the script runtime reports completions
//! through. String-keyed, string-valued, callable from any thread.

/// Completion notifications from the script runtime.
///
/// Both entry points tolerate unknown codes and repeated delivery for the
/// same code (no-op after the first resolution).
pub trait CallbackChannel: Send + Sync {
    /// The call tagged `code` finished; `payload` is its JSON result, `None`
    /// when the function returned nothing.
    fn on_success_notification(&self, code: &str, payload: Option<String>);

    /// The call tagged `code` failed inside the script runtime.
    fn on_error_notification(&self, code: &str, message: String);
}
