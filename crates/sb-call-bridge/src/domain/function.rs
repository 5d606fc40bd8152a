//! Function references on both sides of the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the script runtime reaches a function: an optional global variable
/// holding the script object, plus the function name on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFunctionRef {
    /// Script variable the function lives on (`None` for globals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Function name inside the script runtime
    pub function: String,
}

impl RemoteFunctionRef {
    pub fn new(variable: Option<&str>, function: &str) -> Self {
        Self {
            variable: variable.map(str::to_string),
            function: function.to_string(),
        }
    }

    /// Global function, not attached to any script variable.
    pub fn global(function: &str) -> Self {
        Self::new(None, function)
    }
}

impl fmt::Display for RemoteFunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variable {
            Some(variable) => write!(f, "{}.{}", variable, self.function),
            None => f.write_str(&self.function),
        }
    }
}

/// Target of one logical call: the host-side name it was invoked under and
/// the remote reference it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Host-side method name (for logging and error messages)
    pub name: String,
    /// Remote invocation reference
    pub remote: RemoteFunctionRef,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, remote: RemoteFunctionRef) -> Self {
        Self {
            name: name.into(),
            remote,
        }
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.remote)
    }
}
