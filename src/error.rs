use crate::call::MethodSignature;

/// Boxed error raised by a remote method handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the context propagation crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dispatching the wrapped call failed
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The envelope could not be encoded or decoded
    #[error("Invocation codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Only the trusted constructor may produce an authenticated token
    #[error("Cannot mark token as authenticated: use the trusted constructor instead")]
    TrustedTokenRequired,

    /// The configured holder strategy name is unknown
    #[error("Unknown context holder strategy '{value}'")]
    InvalidStrategy {
        /// The rejected value
        value: String,
    },
}

/// Failures surfaced by dispatching a remote call against its target.
///
/// These are passed through the envelope unchanged; the envelope itself
/// adds no failure kind of its own.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The target exposes no method matching the call's signature
    #[error("No such method: {signature}")]
    MethodNotFound {
        /// The requested signature
        signature: MethodSignature,
    },

    /// The method exists but may not be invoked remotely
    #[error("Access denied to method: {signature}")]
    AccessDenied {
        /// The requested signature
        signature: MethodSignature,
    },

    /// The method ran and raised an error
    #[error("Method {signature} failed: {source}")]
    TargetFailed {
        /// The invoked signature
        signature: MethodSignature,
        /// The error raised by the method
        #[source]
        source: BoxError,
    },
}

impl InvocationError {
    /// Returns the signature the failed dispatch was aimed at.
    pub fn signature(&self) -> &MethodSignature {
        match self {
            InvocationError::MethodNotFound { signature }
            | InvocationError::AccessDenied { signature }
            | InvocationError::TargetFailed { signature, .. } => signature,
        }
    }
}
