//! Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod codec;
pub mod codes;
pub mod delivery;
pub mod fault;
pub mod transport;

pub use codec::JsonCodec;
pub use codes::RandomCodeGenerator;
pub use delivery::{DeliveryLoop, QueuedDelivery};
pub use fault::{FaultChannel, PanicFaultSink};
pub use transport::ChannelTransport;
