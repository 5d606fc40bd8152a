//! Outbound Ports (Driven Ports)
//!
//! Collaborators the dispatcher depends on. All are injected at
//! construction; none is a process-wide singleton.

use crate::domain::{BridgeTargetId, CorrelationCode, DecodeTarget, ScriptCommand};
use crate::error::{BridgeError, ConversionError};
use crate::ports::CallbackChannel;
use serde_json::Value;
use std::fmt;
use std::sync::Weak;

/// Unit of work scheduled onto the delivery context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// One-way command channel into the script runtime.
pub trait ScriptTransport: Send + Sync {
    /// Submit a command. Fire-and-forget: failures are the transport's
    /// concern and never reach the dispatcher.
    fn submit(&self, command: ScriptCommand);

    /// Make `callbacks` reachable from the script runtime under `target`.
    fn register_target(&self, target: &BridgeTargetId, callbacks: Weak<dyn CallbackChannel>);
}

/// JSON encode/decode capability.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, ConversionError>;

    /// Decode `text` into a document suitable for `target`.
    fn decode(&self, text: &str, target: &DecodeTarget) -> Result<Value, ConversionError>;
}

/// The single designated context all continuations run on.
pub trait DeliveryContext: Send + Sync {
    /// Schedule `task` to run later on the designated context. Ordering
    /// between tasks is not guaranteed.
    fn run(&self, task: Task);
}

/// Error that reached neither an error continuation nor the drop policy.
#[derive(Debug, Clone, PartialEq)]
pub struct UnhandledFault {
    pub code: CorrelationCode,
    pub function: String,
    pub error: BridgeError,
}

impl fmt::Display for UnhandledFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unhandled error in call {} to '{}': {}",
            self.code, self.function, self.error
        )
    }
}

/// Ambient fault channel for calls that opted into `throw_on_error`.
pub trait FaultSink: Send + Sync {
    fn raise(&self, fault: UnhandledFault);
}

/// Source of fresh correlation codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> CorrelationCode;
}
