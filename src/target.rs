//! Objects that remote calls are dispatched against.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::call::MethodSignature;
use crate::context::SecurityContext;
use crate::error::{BoxError, InvocationError};

/// A service that can execute remote method calls.
///
/// The security context for the call is passed explicitly; it is also
/// present in the ambient holder while the call runs.
pub trait RemoteTarget {
    /// Executes the method identified by `signature`.
    ///
    /// # Errors
    ///
    /// [`InvocationError::MethodNotFound`] if no such method exists,
    /// [`InvocationError::AccessDenied`] if it may not be called remotely,
    /// [`InvocationError::TargetFailed`] if the method itself failed.
    fn invoke_method(
        &self,
        signature: &MethodSignature,
        arguments: &[Value],
        context: &SecurityContext,
    ) -> Result<Value, InvocationError>;
}

/// Handler executing one exposed method.
pub type MethodHandler =
    Box<dyn Fn(&[Value], &SecurityContext) -> Result<Value, BoxError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Remote,
    Internal,
}

struct Entry {
    visibility: Visibility,
    handler: MethodHandler,
}

/// A [`RemoteTarget`] backed by a table of method handlers.
///
/// # Examples
///
/// ```
/// use context_propagation::{MethodCall, SecurityContext, ServiceTarget};
/// use serde_json::json;
///
/// let target = ServiceTarget::new("greeter").method("greet", &["String"], |args, _ctx| {
///     Ok(json!(format!("hello {}", args[0].as_str().unwrap_or("?"))))
/// });
///
/// let call = MethodCall::new("greet").with_argument("String", json!("alice"));
/// let result = call.invoke(&target, &SecurityContext::empty()).unwrap();
/// assert_eq!(result, json!("hello alice"));
/// ```
pub struct ServiceTarget {
    name: String,
    methods: HashMap<MethodSignature, Entry>,
}

impl ServiceTarget {
    /// Creates an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// The service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposes a method to remote callers.
    pub fn method<F>(self, name: &str, parameter_types: &[&str], handler: F) -> Self
    where
        F: Fn(&[Value], &SecurityContext) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(name, parameter_types, Visibility::Remote, Box::new(handler))
    }

    /// Registers a method that exists on the service but is refused to
    /// remote callers.
    pub fn internal_method<F>(self, name: &str, parameter_types: &[&str], handler: F) -> Self
    where
        F: Fn(&[Value], &SecurityContext) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(
            name,
            parameter_types,
            Visibility::Internal,
            Box::new(handler),
        )
    }

    /// Returns true if a method with this signature is registered.
    pub fn has_method(&self, signature: &MethodSignature) -> bool {
        self.methods.contains_key(signature)
    }

    fn register(
        mut self,
        name: &str,
        parameter_types: &[&str],
        visibility: Visibility,
        handler: MethodHandler,
    ) -> Self {
        let signature = MethodSignature::new(
            name,
            parameter_types.iter().map(|t| t.to_string()).collect(),
        );
        let entry = Entry {
            visibility,
            handler,
        };
        self.methods.insert(signature, entry);
        self
    }
}

impl RemoteTarget for ServiceTarget {
    fn invoke_method(
        &self,
        signature: &MethodSignature,
        arguments: &[Value],
        context: &SecurityContext,
    ) -> Result<Value, InvocationError> {
        let entry = self
            .methods
            .get(signature)
            .filter(|_| arguments.len() == signature.parameter_types().len())
            .ok_or_else(|| InvocationError::MethodNotFound {
                signature: signature.clone(),
            })?;

        if entry.visibility == Visibility::Internal {
            return Err(InvocationError::AccessDenied {
                signature: signature.clone(),
            });
        }

        (entry.handler)(arguments, context).map_err(|source| InvocationError::TargetFailed {
            signature: signature.clone(),
            source,
        })
    }
}

impl fmt::Debug for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut signatures: Vec<String> = self.methods.keys().map(|s| s.to_string()).collect();
        signatures.sort();
        f.debug_struct("ServiceTarget")
            .field("name", &self.name)
            .field("methods", &signatures)
            .finish()
    }
}
