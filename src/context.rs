use std::sync::Arc;

use crate::authentication::Authentication;

/// The security information associated with the current unit of work.
///
/// A `SecurityContext` is a plain value: it can be passed explicitly
/// through a call chain, or parked in a [`ContextHolder`](crate::ContextHolder)
/// for code that reads the ambient identity.
///
/// # Examples
///
/// ```
/// use context_propagation::{SecurityContext, UsernamePasswordToken};
///
/// let empty = SecurityContext::empty();
/// assert!(empty.authentication().is_none());
///
/// let ctx = SecurityContext::with_authentication(UsernamePasswordToken::new("alice", None));
/// assert_eq!(ctx.authentication().map(|a| a.name()), Some("alice".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Arc<dyn Authentication>>,
}

impl SecurityContext {
    /// Creates a context with no authentication.
    pub const fn empty() -> Self {
        Self {
            authentication: None,
        }
    }

    /// Creates a context holding the given authentication.
    pub fn with_authentication(authentication: impl Authentication + 'static) -> Self {
        Self {
            authentication: Some(Arc::new(authentication)),
        }
    }

    /// Creates a context from an already type-erased authentication.
    pub fn from_boxed(authentication: Box<dyn Authentication>) -> Self {
        Self {
            authentication: Some(Arc::from(authentication)),
        }
    }

    /// Returns the current authentication, if any.
    pub fn authentication(&self) -> Option<&dyn Authentication> {
        self.authentication.as_deref()
    }

    /// Replaces the current authentication.
    pub fn set_authentication(&mut self, authentication: Option<Arc<dyn Authentication>>) {
        self.authentication = authentication;
    }

    /// Returns true when no authentication is present.
    pub fn is_empty(&self) -> bool {
        self.authentication.is_none()
    }
}
