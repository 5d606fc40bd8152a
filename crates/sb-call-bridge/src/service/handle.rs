//! Caller-side handle for a dispatched call.

use crate::domain::{CallOutput, ContinuationSlot, CorrelationCode};
use crate::error::BridgeError;
use std::fmt;
use std::marker::PhantomData;

/// Handle returned by a dispatch, used to attach continuations.
///
/// Continuations attached after the call resolved are never invoked, so
/// attach them before yielding the delivery context.
///
/// ```ignore
/// calc.add(1, 2)?
///     .on_success(|sum| println!("sum = {:?}", sum))
///     .on_error(|e| eprintln!("add failed: {}", e));
/// ```
pub struct PendingCallHandle<T> {
    code: CorrelationCode,
    function: String,
    slot: ContinuationSlot,
    _output: PhantomData<fn() -> T>,
}

impl<T: CallOutput> PendingCallHandle<T> {
    pub(crate) fn new(code: CorrelationCode, function: String, slot: ContinuationSlot) -> Self {
        Self {
            code,
            function,
            slot,
            _output: PhantomData,
        }
    }

    /// Correlation code the call was submitted under.
    pub fn code(&self) -> &CorrelationCode {
        &self.code
    }

    /// Host-side name of the called function.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Run `f` with the converted result on success.
    ///
    /// `None` when the script returned nothing or the call expects no value.
    /// A payload that does not convert to `T` goes to the error path instead.
    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(Option<T>) + Send + 'static,
    {
        self.slot.lock().on_success = Some(Box::new(move |delivery| {
            let value = T::from_delivery(delivery)?;
            f(value);
            Ok(())
        }));
        self
    }

    /// Run `f` with the error when the call fails.
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: FnOnce(BridgeError) + Send + 'static,
    {
        self.slot.lock().on_error = Some(Box::new(f));
        self
    }

    /// Raise errors to the fault sink when no error continuation is set.
    pub fn throw_on_error(self) -> Self {
        self.slot.lock().throw_on_unhandled_error = true;
        self
    }
}

impl<T> fmt::Debug for PendingCallHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCallHandle")
            .field("code", &self.code)
            .field("function", &self.function)
            .field("continuations", &*self.slot.lock())
            .finish()
    }
}
