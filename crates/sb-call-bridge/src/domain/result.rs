//! Result shapes and payload delivery.
//!
//! The shape a call expects is resolved once, at dispatch time, into a
//! `ResultShape`. Completion then only has to follow the tag:
//!
//! ```text
//! ResultType (declared)  ──resolve──►  ResultShape
//!   ()                                   NoValue
//!   RawResponse / "raw"                  RawPassthrough
//!   T: Deserialize / "object", ...       Decodable(DecodeTarget)
//!   anything else                        UnsupportedResultType
//! ```

use crate::error::{BridgeError, ConversionError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::{type_name, TypeId};
use std::fmt;
use std::str::FromStr;

/// Undecoded payload, delivered exactly as the script runtime sent it.
///
/// Request it as a result type to defer or customize parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(String);

impl RawResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the payload as JSON into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ConversionError> {
        serde_json::from_str(&self.0).map_err(|e| ConversionError::Malformed {
            target: type_name::<T>().to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON value kinds usable in interface descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Any,
    Object,
    Array,
    String,
    Number,
    Integer,
    Bool,
}

impl JsonKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
        }
    }

    /// Name of the kind a value actually has (for mismatch messages).
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_f64() => "number",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl FromStr for JsonKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "json" => Ok(Self::Any),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" | "int" => Ok(Self::Integer),
            "bool" | "boolean" => Ok(Self::Bool),
            other => Err(BridgeError::UnsupportedResultType(other.to_string())),
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result type as the call site declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultType {
    /// No value expected
    Unit,
    /// Undecoded pass-through (`RawResponse`)
    Raw,
    /// Statically known Rust type, decoded through serde
    Typed(&'static str),
    /// Name from an interface description, resolved at dispatch
    Declared(String),
}

impl ResultType {
    /// Result type for a Rust type parameter.
    pub fn of<T: 'static>() -> Self {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<()>() {
            Self::Unit
        } else if id == TypeId::of::<RawResponse>() {
            Self::Raw
        } else {
            Self::Typed(type_name::<T>())
        }
    }

    pub fn declared(name: impl Into<String>) -> Self {
        Self::Declared(name.into())
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Raw => f.write_str("raw"),
            Self::Typed(name) => f.write_str(name),
            Self::Declared(name) => f.write_str(name),
        }
    }
}

/// What a decodable payload is decoded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeTarget {
    Typed(&'static str),
    Json(JsonKind),
}

impl fmt::Display for DecodeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(name) => f.write_str(name),
            Self::Json(kind) => write!(f, "json {}", kind),
        }
    }
}

/// Resolved result shape, computed once per call at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultShape {
    NoValue,
    RawPassthrough,
    Decodable(DecodeTarget),
}

impl ResultShape {
    /// Resolve a declared result type, rejecting anything the bridge cannot
    /// deliver.
    pub fn resolve(result_type: &ResultType) -> Result<Self, BridgeError> {
        match result_type {
            ResultType::Unit => Ok(Self::NoValue),
            ResultType::Raw => Ok(Self::RawPassthrough),
            ResultType::Typed(name) => Ok(Self::Decodable(DecodeTarget::Typed(name))),
            ResultType::Declared(name) => match name.trim().to_ascii_lowercase().as_str() {
                "void" | "unit" | "none" | "()" => Ok(Self::NoValue),
                "raw" => Ok(Self::RawPassthrough),
                _ => name
                    .parse::<JsonKind>()
                    .map(|kind| Self::Decodable(DecodeTarget::Json(kind)))
                    .map_err(|_| BridgeError::UnsupportedResultType(name.clone())),
            },
        }
    }
}

/// Value handed to a success continuation before typed conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// No payload, or the call expects no value
    Nothing,
    Raw(RawResponse),
    Document(Value),
}

/// Types a bridged call can produce.
///
/// Blanket-implemented for every owned deserializable type; `()` and
/// `RawResponse` resolve to their dedicated shapes through `ResultType::of`.
pub trait CallOutput: Sized + Send + 'static {
    fn result_type() -> ResultType;

    /// Convert a delivery into the caller's type. `Ok(None)` means "no value".
    fn from_delivery(delivery: Delivery) -> Result<Option<Self>, ConversionError>;
}

impl<T> CallOutput for T
where
    T: DeserializeOwned + Send + 'static,
{
    fn result_type() -> ResultType {
        ResultType::of::<T>()
    }

    fn from_delivery(delivery: Delivery) -> Result<Option<Self>, ConversionError> {
        let value = match delivery {
            Delivery::Nothing => return Ok(None),
            Delivery::Raw(raw) => Value::String(raw.into_string()),
            Delivery::Document(value) => value,
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ConversionError::Malformed {
                target: type_name::<T>().to_string(),
                reason: e.to_string(),
            })
    }
}
