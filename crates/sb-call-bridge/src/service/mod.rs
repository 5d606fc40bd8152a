//! Service Layer
//!
//! The call registry, the dispatcher that drives it and the caller-side
//! handle.

pub mod dispatcher;
pub mod handle;
pub mod registry;

pub use dispatcher::{sweep_task, CallDispatcher, CallDispatcherBuilder};
pub use handle::PendingCallHandle;
pub use registry::{CallRegistry, RegistryStats, DEFAULT_MAX_CODE_ATTEMPTS};
