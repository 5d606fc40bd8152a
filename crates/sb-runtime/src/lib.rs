//! # Script Bridge Runtime
//!
//! A stand-in for an embedded script runtime. It consumes `ScriptCommand`s
//! from a `ChannelTransport`, evaluates Rust closures registered under
//! script-side names and reports each outcome through the callback channel
//! of the command's bridge target.
//!
//! Every command is evaluated on its own tokio task after a random delay, so
//! completions arrive out of order and on threads the host does not own.

pub mod engine;

pub use engine::{ScriptEngine, ScriptFunction};
