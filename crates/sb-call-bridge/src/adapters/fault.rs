//! Fault sinks for errors raised under `throw_on_error`.

use crate::ports::{FaultSink, UnhandledFault};
use tokio::sync::mpsc;
use tracing::error;

/// Panics on the delivery context.
///
/// The closest equivalent of rethrowing on the host's main thread. The panic
/// unwinds the current delivery task only; `DeliveryLoop` logs it and keeps
/// delivering other calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicFaultSink;

impl FaultSink for PanicFaultSink {
    fn raise(&self, fault: UnhandledFault) {
        error!(
            code = %fault.code,
            function = %fault.function,
            error = %fault.error,
            "Unhandled script call error"
        );
        panic!("{}", fault);
    }
}

/// Forwards faults to a channel the host drains at its own pace.
#[derive(Debug, Clone)]
pub struct FaultChannel {
    tx: mpsc::UnboundedSender<UnhandledFault>,
}

impl FaultChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UnhandledFault>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FaultSink for FaultChannel {
    fn raise(&self, fault: UnhandledFault) {
        error!(
            code = %fault.code,
            function = %fault.function,
            error = %fault.error,
            "Unhandled script call error"
        );
        if let Err(e) = self.tx.send(fault) {
            error!(fault = %e.0, "Fault receiver dropped, fault lost");
        }
    }
}
