//! Pending calls and their continuations.

use crate::domain::{CorrelationCode, Delivery, FunctionDescriptor, ResultShape};
use crate::error::{BridgeError, ConversionError};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Success continuation after type erasure.
///
/// Returns `Err` when the delivery cannot be converted into the caller's
/// type, so the dispatcher can route the failure through the error path.
pub type SuccessFn = Box<dyn FnOnce(Delivery) -> Result<(), ConversionError> + Send>;

/// Error continuation.
pub type ErrorFn = Box<dyn FnOnce(BridgeError) + Send>;

/// Continuations attached to a call.
#[derive(Default)]
pub struct Continuations {
    pub on_success: Option<SuccessFn>,
    pub on_error: Option<ErrorFn>,
    /// Raise errors to the fault sink when no error continuation is set
    pub throw_on_unhandled_error: bool,
}

impl std::fmt::Debug for Continuations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuations")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("throw_on_unhandled_error", &self.throw_on_unhandled_error)
            .finish()
    }
}

/// Slot shared between a pending call and the caller's handle, so
/// continuations can be attached after the call was dispatched.
pub type ContinuationSlot = Arc<Mutex<Continuations>>;

/// One outstanding call awaiting a remote result.
#[derive(Debug)]
pub struct PendingCall {
    pub code: CorrelationCode,
    pub function: FunctionDescriptor,
    pub args: Vec<Value>,
    pub shape: ResultShape,
    pub created_at: Instant,
    /// Expiry policy (`None` = wait forever)
    pub timeout: Option<Duration>,
    continuations: ContinuationSlot,
}

impl PendingCall {
    pub fn new(
        code: CorrelationCode,
        function: FunctionDescriptor,
        args: Vec<Value>,
        shape: ResultShape,
    ) -> Self {
        Self {
            code,
            function,
            args,
            shape,
            created_at: Instant::now(),
            timeout: None,
            continuations: ContinuationSlot::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handle on the continuation slot for the caller side.
    pub fn slot(&self) -> ContinuationSlot {
        Arc::clone(&self.continuations)
    }

    /// Take the continuations out, leaving the slot empty.
    ///
    /// Called once, when the call resolves; anything attached afterwards is
    /// never invoked.
    pub fn take_continuations(&self) -> Continuations {
        std::mem::take(&mut *self.continuations.lock())
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.timeout
            .map(|timeout| now.saturating_duration_since(self.created_at) > timeout)
            .unwrap_or(false)
    }
}
