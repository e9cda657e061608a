//! Receiving-side execution of propagated invocations.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::SecurityContext;
use crate::error::InvocationError;
use crate::holder::{ContextGuard, ContextHolder, ThreadLocalContextHolder};
use crate::invocation::ContextPropagatingInvocation;
use crate::request_factory::{AuthenticationRequestFactory, UsernamePasswordRequestFactory};
use crate::target::RemoteTarget;

/// Executes [`ContextPropagatingInvocation`]s against their targets.
///
/// For each invocation the executor:
/// 1. builds an identity from the carried principal and credentials with
///    its [`AuthenticationRequestFactory`] and marks it unauthenticated,
/// 2. installs it in its [`ContextHolder`] and passes it to the target,
/// 3. clears the holder once the call finishes, whatever the outcome.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     Authentication, ContextPropagatingInvocation, InvocationExecutor, MethodCall,
///     SecurityContext, ServiceTarget, UsernamePasswordToken,
/// };
/// use serde_json::json;
///
/// let executor = InvocationExecutor::new().with_request_factory(
///     |principal: &str, credentials: Option<&str>| -> Box<dyn Authentication> {
///         Box::new(UsernamePasswordToken::new(format!("remote:{principal}"), credentials))
///     },
/// );
///
/// let ctx = SecurityContext::with_authentication(UsernamePasswordToken::new("alice", None));
/// let invocation = ContextPropagatingInvocation::from_context(MethodCall::new("whoami"), &ctx);
/// let target = ServiceTarget::new("users").method("whoami", &[], |_, ctx| {
///     Ok(json!(ctx.authentication().map(|a| a.name())))
/// });
///
/// assert_eq!(executor.execute(&invocation, &target).unwrap(), json!("remote:alice"));
/// ```
#[derive(Clone)]
pub struct InvocationExecutor {
    request_factory: Arc<dyn AuthenticationRequestFactory>,
    holder: Arc<dyn ContextHolder>,
}

impl InvocationExecutor {
    /// Creates an executor installing [`UsernamePasswordToken`](crate::UsernamePasswordToken)
    /// requests into the thread-local holder.
    pub fn new() -> Self {
        Self {
            request_factory: Arc::new(UsernamePasswordRequestFactory),
            holder: Arc::new(ThreadLocalContextHolder),
        }
    }

    /// Replaces the factory used to build the installed identity.
    pub fn with_request_factory(
        mut self,
        request_factory: impl AuthenticationRequestFactory + 'static,
    ) -> Self {
        self.request_factory = Arc::new(request_factory);
        self
    }

    /// Replaces the holder the identity is installed into.
    pub fn with_holder(mut self, holder: Arc<dyn ContextHolder>) -> Self {
        self.holder = holder;
        self
    }

    /// The holder this executor installs identities into.
    pub fn holder(&self) -> &Arc<dyn ContextHolder> {
        &self.holder
    }

    /// Executes `invocation` against `target`.
    ///
    /// When the envelope carries no principal the holder is left as it is
    /// during the call and the target receives an empty context. The holder
    /// is cleared afterwards in every case, including when the target
    /// returns an error or panics.
    ///
    /// # Errors
    ///
    /// Propagates the target's [`InvocationError`] unchanged.
    pub fn execute(
        &self,
        invocation: &ContextPropagatingInvocation,
        target: &dyn RemoteTarget,
    ) -> Result<Value, InvocationError> {
        let guard = ContextGuard::new(self.holder.as_ref());

        let context = match invocation.principal() {
            Some(principal) => {
                let credentials = invocation
                    .credentials()
                    .map(|secret| secret.expose_secret().as_str());
                let mut request = self
                    .request_factory
                    .create_authentication_request(principal, credentials);
                request.mark_unauthenticated();

                tracing::debug!(
                    principal = %request.name(),
                    authenticated = request.is_authenticated(),
                    "Set security context to contain propagated request"
                );

                let context = SecurityContext::from_boxed(request);
                guard.install(context.clone());
                context
            }
            None => SecurityContext::empty(),
        };

        invocation.call().invoke(target, &context)
    }
}

impl Default for InvocationExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvocationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationExecutor")
            .field("strategy", &self.holder.strategy())
            .finish_non_exhaustive()
    }
}
