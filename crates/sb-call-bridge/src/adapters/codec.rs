//! JSON payload codec backed by serde_json.

use crate::domain::{DecodeTarget, JsonKind};
use crate::error::ConversionError;
use crate::ports::PayloadCodec;
use serde_json::Value;

/// Default `PayloadCodec`.
///
/// Decoding parses the text into a document and, for declared JSON kinds,
/// checks the document has that kind. Typed targets are checked later by
/// serde when the caller's type is built from the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, ConversionError> {
        serde_json::to_string(value).map_err(|e| ConversionError::Encode(e.to_string()))
    }

    fn decode(&self, text: &str, target: &DecodeTarget) -> Result<Value, ConversionError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConversionError::Malformed {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        if let DecodeTarget::Json(kind) = target {
            if !kind.matches(&value) {
                return Err(ConversionError::ShapeMismatch {
                    target: target.to_string(),
                    expected: kind.name().to_string(),
                    found: JsonKind::describe(&value).to_string(),
                });
            }
        }

        Ok(value)
    }
}
