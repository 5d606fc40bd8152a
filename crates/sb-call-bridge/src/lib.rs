// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Script Bridge call correlation core.
//!
//! Lets a host invoke functions inside an embedded script runtime as if they
//! were local, asynchronous method calls. The runtime reports back only
//! through a string-keyed callback channel, out of order and on its own
//! thread; this crate matches those notifications to the calls that caused
//! them and delivers typed results on one designated context.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         CALL BRIDGE                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  script_interface! / DynamicStub                                  │
//! │              │ dispatch(function, args, result type)              │
//! │  ┌───────────┴──────────┐      ┌──────────────────────────┐       │
//! │  │    CallDispatcher    │─────►│ CallRegistry (code → call)│      │
//! │  └───┬──────────────▲───┘      └──────────────────────────┘       │
//! │      │ ScriptCommand│ on_success / on_error notification          │
//! └──────┼──────────────┼────────────────────────────────────────────┘
//!        ▼              │
//!   ScriptTransport ──► script runtime ──► CallbackChannel
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sb_call_bridge::{script_interface, CallDispatcher, ChannelTransport, DeliveryLoop};
//!
//! script_interface! {
//!     pub struct Calculator as "calc" {
//!         fn add(a: i64, b: i64) -> i64;
//!     }
//! }
//!
//! let (transport, commands) = ChannelTransport::new();
//! let dispatcher = CallDispatcher::builder()
//!     .transport(transport)
//!     .delivery(Arc::new(DeliveryLoop::spawn("bridge-delivery")?))
//!     .build()?;
//!
//! Calculator::new(dispatcher)
//!     .add(1, 2)?
//!     .on_success(|sum| println!("sum = {:?}", sum))
//!     .on_error(|e| eprintln!("add failed: {}", e));
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
// Test-specific allows
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod stub;

pub use adapters::{
    ChannelTransport, DeliveryLoop, FaultChannel, JsonCodec, PanicFaultSink, QueuedDelivery,
    RandomCodeGenerator,
};
pub use domain::{
    BridgeConfig, BridgeConfigBuilder, BridgeTargetId, CallOutput, CorrelationCode, Delivery,
    FunctionDescriptor, FunctionSpec, InterfaceDescription, JsonKind, RawResponse,
    RemoteFunctionRef, ResultShape, ResultType, ScriptCommand,
};
pub use error::{BridgeError, ConversionError};
pub use metrics::{BridgeMetrics, BridgeMetricsSnapshot};
pub use ports::{
    CallbackChannel, CodeGenerator, DeliveryContext, FaultSink, PayloadCodec, ScriptTransport,
    UnhandledFault,
};
pub use service::{
    sweep_task, CallDispatcher, CallDispatcherBuilder, CallRegistry, PendingCallHandle,
};
pub use stub::DynamicStub;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
