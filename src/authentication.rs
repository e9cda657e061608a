//! Identity values held by a security context.

use std::any::Any;
use std::fmt;

use crate::error::Error;
use crate::secret::Secret;

/// An authenticated or requested identity.
///
/// The principal may be any displayable value (a username, a user record,
/// a certificate subject). Credentials are exposed only in their string
/// form, wrapped in [`Secret`].
pub trait Authentication: fmt::Debug + Send + Sync {
    /// The identity being asserted.
    fn principal(&self) -> &dyn fmt::Display;

    /// String form of the credentials proving the principal, if any.
    fn credentials(&self) -> Option<Secret<String>>;

    /// Whether an authority has verified this identity.
    fn is_authenticated(&self) -> bool;

    /// Demotes this value to an unverified request.
    fn mark_unauthenticated(&mut self);

    /// Allows hosts to recover the concrete identity type.
    fn as_any(&self) -> &dyn Any;

    /// The principal's string form.
    fn name(&self) -> String {
        self.principal().to_string()
    }
}

/// A username/password identity.
///
/// Built with [`new`](Self::new) it is an unauthenticated request, as
/// installed on the receiving side of a remote call. Only
/// [`authenticated`](Self::authenticated) produces a trusted token.
///
/// # Examples
///
/// ```
/// use context_propagation::{Authentication, UsernamePasswordToken};
///
/// let request = UsernamePasswordToken::new("alice", Some("hunter2"));
/// assert_eq!(request.name(), "alice");
/// assert!(!request.is_authenticated());
/// assert_eq!(format!("{:?}", request.credentials()), "Some([REDACTED])");
/// ```
#[derive(Debug)]
pub struct UsernamePasswordToken {
    principal: String,
    credentials: Option<Secret<String>>,
    authorities: Vec<String>,
    authenticated: bool,
}

impl UsernamePasswordToken {
    /// Creates an unauthenticated authentication request.
    pub fn new(principal: impl Into<String>, credentials: Option<&str>) -> Self {
        Self {
            principal: principal.into(),
            credentials: credentials.map(|c| Secret::new(c.to_string())),
            authorities: Vec::new(),
            authenticated: false,
        }
    }

    /// Creates a trusted token carrying granted authorities.
    ///
    /// Reserved for authentication logic that has verified the credentials.
    pub fn authenticated(
        principal: impl Into<String>,
        credentials: Option<&str>,
        authorities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            authorities: authorities.into_iter().map(Into::into).collect(),
            authenticated: true,
            ..Self::new(principal, credentials)
        }
    }

    /// Returns the authorities granted to this principal.
    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Sets the authenticated flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrustedTokenRequired`] when asked to mark the token
    /// authenticated; use [`authenticated`](Self::authenticated) instead.
    pub fn set_authenticated(&mut self, authenticated: bool) -> Result<(), Error> {
        if authenticated {
            return Err(Error::TrustedTokenRequired);
        }
        self.authenticated = false;
        Ok(())
    }
}

impl Authentication for UsernamePasswordToken {
    fn principal(&self) -> &dyn fmt::Display {
        &self.principal
    }

    fn credentials(&self) -> Option<Secret<String>> {
        self.credentials
            .as_ref()
            .map(|c| Secret::new(c.expose_secret().clone()))
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn mark_unauthenticated(&mut self) {
        self.authenticated = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
