//! Interface descriptions for configuration-time stubs.
//!
//! ```json
//! {
//!   "variable": "calc",
//!   "functions": [
//!     { "name": "add", "args": ["number", "number"], "result": "number" },
//!     { "name": "reset", "result": "void" },
//!     { "name": "fetchUser", "remote_name": "loadUser", "args": ["integer"], "result": "object" }
//!   ]
//! }
//! ```

use crate::domain::{FunctionDescriptor, JsonKind, RemoteFunctionRef, ResultType};
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// One function a script object exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Host-side name
    pub name: String,
    /// Script-side name, when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
    /// Positional argument kinds
    #[serde(default)]
    pub args: Vec<JsonKind>,
    /// Declared result type name (`void`, `raw`, `object`, ...)
    #[serde(default = "default_result")]
    pub result: String,
}

fn default_result() -> String {
    "void".to_string()
}

impl FunctionSpec {
    pub fn result_type(&self) -> ResultType {
        ResultType::declared(self.result.clone())
    }

    pub fn descriptor(&self, variable: Option<&str>) -> FunctionDescriptor {
        let remote = self.remote_name.as_deref().unwrap_or(&self.name);
        FunctionDescriptor::new(self.name.clone(), RemoteFunctionRef::new(variable, remote))
    }
}

/// Declared shape of a script object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescription {
    /// Script variable holding the object (`None` for global functions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    pub functions: Vec<FunctionSpec>,
}

impl InterfaceDescription {
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text)
            .map_err(|e| BridgeError::Config(format!("invalid interface description: {}", e)))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }
}
