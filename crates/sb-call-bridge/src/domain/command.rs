//! Command envelope handed to the script transport.

use crate::domain::{BridgeTargetId, CorrelationCode, RemoteFunctionRef};
use crate::error::ConversionError;
use crate::ports::PayloadCodec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One remote invocation, as submitted to the transport.
///
/// The script side calls the function with `args` and reports the outcome
/// through the callback channel registered under `target`, echoing `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptCommand {
    pub target: BridgeTargetId,
    pub function: RemoteFunctionRef,
    pub args: Vec<Value>,
    pub code: CorrelationCode,
}

impl ScriptCommand {
    /// Serialize the envelope for a text-only transport.
    pub fn encode(&self, codec: &dyn PayloadCodec) -> Result<String, ConversionError> {
        let value =
            serde_json::to_value(self).map_err(|e| ConversionError::Encode(e.to_string()))?;
        codec.encode(&value)
    }
}
