//! Host-side stubs.
//!
//! - `script_interface!` declares a typed stub at compile time
//! - `DynamicStub` binds an `InterfaceDescription` loaded at runtime

pub mod dynamic;
mod macros;

pub use dynamic::DynamicStub;

use crate::error::{BridgeError, ConversionError};
use serde::Serialize;
use serde_json::Value;

/// Encode one stub argument into its JSON document.
pub fn encode_arg<A: Serialize + ?Sized>(function: &str, arg: &A) -> Result<Value, BridgeError> {
    serde_json::to_value(arg).map_err(|e| {
        BridgeError::Conversion(ConversionError::Encode(format!(
            "argument of '{}': {}",
            function, e
        )))
    })
}
