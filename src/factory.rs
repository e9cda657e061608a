use std::fmt;
use std::sync::Arc;

use crate::call::MethodCall;
use crate::holder::{ContextHolder, ThreadLocalContextHolder};
use crate::invocation::ContextPropagatingInvocation;

/// Creates the envelope a client proxy sends for each remote call.
pub trait RemoteInvocationFactory {
    /// Wraps `call` for transport.
    fn create_remote_invocation(&self, call: MethodCall) -> ContextPropagatingInvocation;
}

/// Captures the caller's identity from a configured holder.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     ContextHolder, ContextPropagatingInvocationFactory, MethodCall, RemoteInvocationFactory,
///     SecurityContext, ThreadLocalContextHolder, UsernamePasswordToken,
/// };
///
/// ThreadLocalContextHolder.set_context(SecurityContext::with_authentication(
///     UsernamePasswordToken::new("alice", Some("pw")),
/// ));
///
/// let factory = ContextPropagatingInvocationFactory::new();
/// let invocation = factory.create_remote_invocation(MethodCall::new("ping"));
/// assert_eq!(invocation.principal(), Some("alice"));
///
/// ThreadLocalContextHolder.clear_context();
/// ```
#[derive(Clone)]
pub struct ContextPropagatingInvocationFactory {
    holder: Arc<dyn ContextHolder>,
}

impl ContextPropagatingInvocationFactory {
    /// Creates a factory reading the thread-local holder.
    pub fn new() -> Self {
        Self::with_holder(Arc::new(ThreadLocalContextHolder))
    }

    /// Creates a factory reading `holder`.
    pub fn with_holder(holder: Arc<dyn ContextHolder>) -> Self {
        Self { holder }
    }

    /// The holder identities are captured from.
    pub fn holder(&self) -> &Arc<dyn ContextHolder> {
        &self.holder
    }
}

impl Default for ContextPropagatingInvocationFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteInvocationFactory for ContextPropagatingInvocationFactory {
    fn create_remote_invocation(&self, call: MethodCall) -> ContextPropagatingInvocation {
        ContextPropagatingInvocation::from_holder(call, self.holder.as_ref())
    }
}

impl fmt::Debug for ContextPropagatingInvocationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPropagatingInvocationFactory")
            .field("strategy", &self.holder.strategy())
            .finish()
    }
}
