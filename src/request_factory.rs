use crate::authentication::{Authentication, UsernamePasswordToken};

/// Builds the identity installed on the receiving side of a remote call.
///
/// Receives the principal and credentials exactly as carried by the
/// envelope. Hosts that need a different identity type plug their own
/// factory into [`InvocationExecutor`](crate::InvocationExecutor); closures
/// of the right shape qualify.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     Authentication, AuthenticationRequestFactory, UsernamePasswordToken,
/// };
///
/// let upper = |principal: &str, credentials: Option<&str>| -> Box<dyn Authentication> {
///     Box::new(UsernamePasswordToken::new(principal.to_uppercase(), credentials))
/// };
///
/// let request = upper.create_authentication_request("alice", None);
/// assert_eq!(request.name(), "ALICE");
/// ```
pub trait AuthenticationRequestFactory: Send + Sync {
    /// Creates an identity from the carried strings.
    fn create_authentication_request(
        &self,
        principal: &str,
        credentials: Option<&str>,
    ) -> Box<dyn Authentication>;
}

/// The default factory, producing [`UsernamePasswordToken`] requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernamePasswordRequestFactory;

impl AuthenticationRequestFactory for UsernamePasswordRequestFactory {
    fn create_authentication_request(
        &self,
        principal: &str,
        credentials: Option<&str>,
    ) -> Box<dyn Authentication> {
        Box::new(UsernamePasswordToken::new(principal, credentials))
    }
}

impl<F> AuthenticationRequestFactory for F
where
    F: Fn(&str, Option<&str>) -> Box<dyn Authentication> + Send + Sync,
{
    fn create_authentication_request(
        &self,
        principal: &str,
        credentials: Option<&str>,
    ) -> Box<dyn Authentication> {
        self(principal, credentials)
    }
}
