//! Descriptor of a remote method call.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::SecurityContext;
use crate::error::InvocationError;
use crate::target::RemoteTarget;

/// A method name plus its parameter type names.
///
/// Identifies one method on a [`RemoteTarget`]; overloads differ by
/// parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    name: String,
    parameter_types: Vec<String>,
}

impl MethodSignature {
    /// Creates a signature.
    pub fn new(name: impl Into<String>, parameter_types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter type names, in declaration order.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// The call a caller wants executed on a remote target.
///
/// Arguments travel as JSON values. Attributes carry transport-level
/// extensions that are not method arguments.
///
/// # Examples
///
/// ```
/// use context_propagation::MethodCall;
/// use serde_json::json;
///
/// let call = MethodCall::new("transfer")
///     .with_argument("String", json!("acct-42"))
///     .with_argument("u64", json!(100))
///     .with_attribute("trace-id", json!("abc123"));
///
/// assert_eq!(call.signature().to_string(), "transfer(String, u64)");
/// assert_eq!(call.attribute("trace-id"), Some(&json!("abc123")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    method_name: String,
    #[serde(default)]
    parameter_types: Vec<String>,
    #[serde(default)]
    arguments: Vec<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, Value>,
}

impl MethodCall {
    /// Creates a call to a method taking no arguments.
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            parameter_types: Vec::new(),
            arguments: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Appends an argument together with its parameter type name.
    pub fn with_argument(mut self, parameter_type: impl Into<String>, value: Value) -> Self {
        self.parameter_types.push(parameter_type.into());
        self.arguments.push(value);
        self
    }

    /// Sets a transport attribute, replacing any previous value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// The method name.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The parameter type names.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// The argument values.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Looks up a transport attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// All transport attributes.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// The signature of the method this call targets.
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(self.method_name.clone(), self.parameter_types.clone())
    }

    /// Dispatches this call against `target`.
    ///
    /// # Errors
    ///
    /// Whatever the target reports: [`InvocationError::MethodNotFound`],
    /// [`InvocationError::AccessDenied`] or [`InvocationError::TargetFailed`].
    pub fn invoke(
        &self,
        target: &dyn RemoteTarget,
        context: &SecurityContext,
    ) -> Result<Value, InvocationError> {
        target.invoke_method(&self.signature(), &self.arguments, context)
    }
}
