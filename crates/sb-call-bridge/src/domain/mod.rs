//! Domain Layer
//!
//! Pure types for the call bridge: correlation codes, function references,
//! result shapes, pending calls and configuration. No I/O.

pub mod command;
pub mod config;
pub mod correlation;
pub mod function;
pub mod interface;
pub mod pending;
pub mod result;

pub use command::ScriptCommand;
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use correlation::{BridgeTargetId, CorrelationCode};
pub use function::{FunctionDescriptor, RemoteFunctionRef};
pub use interface::{FunctionSpec, InterfaceDescription};
pub use pending::{ContinuationSlot, Continuations, ErrorFn, PendingCall, SuccessFn};
pub use result::{
    CallOutput, DecodeTarget, Delivery, JsonKind, RawResponse, ResultShape, ResultType,
};
