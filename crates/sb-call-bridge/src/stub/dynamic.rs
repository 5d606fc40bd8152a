//! Configuration-time stubs built from an `InterfaceDescription`.

use crate::domain::{FunctionDescriptor, InterfaceDescription, JsonKind, ResultShape, ResultType};
use crate::error::BridgeError;
use crate::service::{CallDispatcher, PendingCallHandle};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct BoundFunction {
    descriptor: FunctionDescriptor,
    args: Vec<JsonKind>,
    result_type: ResultType,
}

/// Untyped stub for a script object described at runtime.
///
/// Results are delivered as `serde_json::Value`.
pub struct DynamicStub {
    dispatcher: Arc<CallDispatcher>,
    variable: Option<String>,
    functions: HashMap<String, BoundFunction>,
}

impl DynamicStub {
    /// Bind `description` to `dispatcher`.
    ///
    /// Every declared result type is checked here, so an unsupported one
    /// fails the whole stub instead of a single call later.
    pub fn new(
        dispatcher: Arc<CallDispatcher>,
        description: InterfaceDescription,
    ) -> Result<Self, BridgeError> {
        let variable = description.variable;
        let mut functions = HashMap::with_capacity(description.functions.len());

        for spec in description.functions {
            let result_type = spec.result_type();
            ResultShape::resolve(&result_type)?;

            let bound = BoundFunction {
                descriptor: spec.descriptor(variable.as_deref()),
                args: spec.args,
                result_type,
            };
            if functions.insert(spec.name.clone(), bound).is_some() {
                return Err(BridgeError::Config(format!(
                    "function '{}' declared twice",
                    spec.name
                )));
            }
        }

        debug!(
            variable = ?variable,
            functions = functions.len(),
            "Bound dynamic script interface"
        );

        Ok(Self {
            dispatcher,
            variable,
            functions,
        })
    }

    /// Call a declared function with JSON arguments.
    ///
    /// Arity and argument kinds are checked before anything is dispatched.
    pub fn call(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<PendingCallHandle<Value>, BridgeError> {
        let bound = self
            .functions
            .get(name)
            .ok_or_else(|| BridgeError::UnknownFunction(name.to_string()))?;

        if args.len() != bound.args.len() {
            return Err(BridgeError::ArgumentMismatch {
                function: name.to_string(),
                reason: format!("expected {} arguments, got {}", bound.args.len(), args.len()),
            });
        }

        for (index, (kind, arg)) in bound.args.iter().zip(&args).enumerate() {
            if !kind.matches(arg) {
                return Err(BridgeError::ArgumentMismatch {
                    function: name.to_string(),
                    reason: format!(
                        "argument {} expected {}, found {}",
                        index,
                        kind,
                        JsonKind::describe(arg)
                    ),
                });
            }
        }

        self.dispatcher
            .dispatch(bound.descriptor.clone(), args, bound.result_type.clone())
    }

    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Declared function names, in no particular order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}
