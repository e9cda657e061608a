use std::fmt;

use serde::{Deserialize, Deserializer};

/// A wrapper that prevents accidental exposure of sensitive values.
///
/// `Secret<T>` keeps propagated credentials out of logs and debug output.
/// The wrapped value can only be read through the explicit
/// [`expose_secret`](Self::expose_secret) method.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, `Copy` or `Serialize`
/// - Debug and Display output is always `[REDACTED]`
/// - No type information is leaked in formatted output
///
/// # Examples
///
/// ```
/// use context_propagation::Secret;
///
/// let password = Secret::new("hunter2".to_string());
///
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "hunter2");
/// ```
// Do NOT add Clone, Copy, Default or Serialize derives. Envelopes put
// credentials on the wire through `wire` below, explicitly.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// # Security Warning
    ///
    /// Ensure the exposed value is not logged or displayed.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T: PartialEq> PartialEq for Secret<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    /// This MUST unconditionally return "[REDACTED]" (CWE-532).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    /// This MUST unconditionally return "[REDACTED]" (CWE-532).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Secret::new)
    }
}

/// Serde adapter that writes an optional secret string in the clear.
///
/// Only the invocation envelope uses this, for its transport encoding.
pub(crate) mod wire {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Secret;

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<Secret<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(secret) => serializer.serialize_some(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Secret<String>>, D::Error> {
        Option::<Secret<String>>::deserialize(deserializer)
    }
}
