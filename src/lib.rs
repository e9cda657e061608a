//! Security context propagation across remote method invocations.
//!
//! A caller's identity is captured into a [`ContextPropagatingInvocation`]
//! alongside the remote call, travels with it as plain strings, and is
//! re-established as an *unauthenticated* identity on the receiving side for
//! exactly the duration of the call.
//!
//! # Core Types
//!
//! - [`SecurityContext`]: Value holding the current [`Authentication`]
//! - [`ContextHolder`]: Ambient storage for the current context (thread-local or global)
//! - [`ContextPropagatingInvocation`]: The envelope sent from caller to callee
//! - [`InvocationExecutor`]: Receiving-side dispatcher with a pluggable
//!   [`AuthenticationRequestFactory`]
//! - [`Secret<T>`]: Wrapper that redacts credentials in logs/output
//!
//! # Examples
//!
//! ```
//! use context_propagation::{
//!     ContextHolder, ContextPropagatingInvocation, MethodCall, SecurityContext, ServiceTarget,
//!     ThreadLocalContextHolder, UsernamePasswordToken,
//! };
//! use serde_json::json;
//!
//! // Caller: whoever logged in on this thread is captured into the envelope.
//! ThreadLocalContextHolder.set_context(SecurityContext::with_authentication(
//!     UsernamePasswordToken::authenticated("alice", Some("hunter2"), ["ROLE_USER"]),
//! ));
//! let call = MethodCall::new("balance").with_argument("String", json!("acct-1"));
//! let wire = ContextPropagatingInvocation::new(call).to_wire().unwrap();
//! ThreadLocalContextHolder.clear_context();
//!
//! // Callee: the identity is present while the call runs, and gone afterwards.
//! let target = ServiceTarget::new("accounts").method("balance", &["String"], |_, _| {
//!     let ambient = ThreadLocalContextHolder.context();
//!     let auth = ambient.authentication().expect("propagated identity");
//!     assert!(!auth.is_authenticated());
//!     Ok(json!({ "owner": auth.name(), "balance": 10 }))
//! });
//!
//! let received = ContextPropagatingInvocation::from_wire(&wire).unwrap();
//! let result = received.invoke(&target).unwrap();
//!
//! assert_eq!(result["owner"], "alice");
//! assert!(ThreadLocalContextHolder.context().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod authentication;
mod call;
mod config;
mod context;
mod error;
mod executor;
mod factory;
mod holder;
mod invocation;
mod request_factory;
mod secret;
mod target;

pub use authentication::{Authentication, UsernamePasswordToken};
pub use call::{MethodCall, MethodSignature};
pub use config::{HolderStrategy, PropagationConfig};
pub use context::SecurityContext;
pub use error::{BoxError, Error, InvocationError};
pub use executor::InvocationExecutor;
pub use factory::{ContextPropagatingInvocationFactory, RemoteInvocationFactory};
pub use holder::{ContextGuard, ContextHolder, GlobalContextHolder, ThreadLocalContextHolder};
pub use invocation::ContextPropagatingInvocation;
pub use request_factory::{AuthenticationRequestFactory, UsernamePasswordRequestFactory};
pub use secret::Secret;
pub use target::{MethodHandler, RemoteTarget, ServiceTarget};
