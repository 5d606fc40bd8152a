//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - the callback channel the script runtime drives
//! - Driven Ports (outbound) - transport, codec, delivery context, faults, codes

pub mod inbound;
pub mod outbound;

pub use inbound::CallbackChannel;
pub use outbound::{
    CodeGenerator, DeliveryContext, FaultSink, PayloadCodec, ScriptTransport, Task,
    UnhandledFault,
};
