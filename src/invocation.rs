//! The envelope that carries a caller's identity along with a remote call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call::MethodCall;
use crate::context::SecurityContext;
use crate::error::{Error, InvocationError};
use crate::executor::InvocationExecutor;
use crate::holder::{ContextHolder, ThreadLocalContextHolder};
use crate::secret::{self, Secret};
use crate::target::RemoteTarget;

/// A remote call plus the caller's principal and credentials.
///
/// Built on the calling side from the current security context, sent over
/// a transport, and executed once on the receiving side.
///
/// Principal and credentials travel only as strings. The receiving side
/// rebuilds an identity from them, so a caller can never inject an
/// arbitrary identity object into the server.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     ContextPropagatingInvocation, MethodCall, SecurityContext, ServiceTarget,
///     UsernamePasswordToken,
/// };
/// use serde_json::json;
///
/// // Caller side
/// let ctx = SecurityContext::with_authentication(UsernamePasswordToken::new("alice", Some("pw")));
/// let invocation = ContextPropagatingInvocation::from_context(MethodCall::new("whoami"), &ctx);
/// let wire = invocation.to_wire().unwrap();
///
/// // Receiving side
/// let target = ServiceTarget::new("users").method("whoami", &[], |_, ctx| {
///     Ok(json!(ctx.authentication().map(|a| a.name())))
/// });
/// let received = ContextPropagatingInvocation::from_wire(&wire).unwrap();
/// assert_eq!(received.invoke(&target).unwrap(), json!("alice"));
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ContextPropagatingInvocation {
    call: MethodCall,
    #[serde(default)]
    principal: Option<String>,
    #[serde(default, with = "secret::wire")]
    credentials: Option<Secret<String>>,
}

impl ContextPropagatingInvocation {
    /// Wraps `call`, capturing the identity from this thread's context.
    pub fn new(call: MethodCall) -> Self {
        Self::from_holder(call, &ThreadLocalContextHolder)
    }

    /// Wraps `call`, capturing the identity from `holder`.
    pub fn from_holder(call: MethodCall, holder: &dyn ContextHolder) -> Self {
        Self::from_context(call, &holder.context())
    }

    /// Wraps `call`, capturing the identity from an explicit context.
    ///
    /// With no authentication in `context` the envelope carries neither
    /// principal nor credentials.
    pub fn from_context(call: MethodCall, context: &SecurityContext) -> Self {
        let (principal, credentials) = match context.authentication() {
            Some(authentication) => (Some(authentication.name()), authentication.credentials()),
            None => (None, None),
        };

        tracing::debug!(
            method = %call.method_name(),
            principal = ?principal,
            "RemoteInvocation now has principal"
        );

        Self {
            call,
            principal,
            credentials,
        }
    }

    /// The wrapped call.
    pub fn call(&self) -> &MethodCall {
        &self.call
    }

    /// The carried principal, in string form.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// The carried credentials, in string form.
    pub fn credentials(&self) -> Option<&Secret<String>> {
        self.credentials.as_ref()
    }

    /// Executes the call on the receiving side with default settings.
    ///
    /// Installs an unauthenticated [`UsernamePasswordToken`](crate::UsernamePasswordToken)
    /// built from the carried strings in this thread's context, dispatches the
    /// call, then clears the context whatever the outcome. Use an
    /// [`InvocationExecutor`] to choose another identity type or holder.
    ///
    /// # Errors
    ///
    /// Propagates the target's [`InvocationError`] unchanged.
    pub fn invoke(&self, target: &dyn RemoteTarget) -> Result<Value, InvocationError> {
        InvocationExecutor::new().execute(self, target)
    }

    /// Encodes the envelope for transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if an argument cannot be encoded.
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes an envelope received from a transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] for malformed input, including a principal
    /// or credentials that are not plain strings.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
