//! Configuration for where the ambient security context is stored.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::executor::InvocationExecutor;
use crate::factory::ContextPropagatingInvocationFactory;
use crate::holder::{ContextHolder, holder_for};

/// Storage strategy for the ambient security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderStrategy {
    /// One context per thread
    #[default]
    #[serde(alias = "MODE_THREADLOCAL", alias = "threadlocal")]
    ThreadLocal,
    /// One context for the whole process
    #[serde(alias = "MODE_GLOBAL")]
    Global,
}

impl fmt::Display for HolderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolderStrategy::ThreadLocal => write!(f, "thread_local"),
            HolderStrategy::Global => write!(f, "global"),
        }
    }
}

impl FromStr for HolderStrategy {
    type Err = Error;

    /// Accepts `thread_local`/`MODE_THREADLOCAL` and `global`/`MODE_GLOBAL`,
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thread_local" | "threadlocal" | "mode_threadlocal" => {
                Ok(HolderStrategy::ThreadLocal)
            }
            "global" | "mode_global" => Ok(HolderStrategy::Global),
            _ => Err(Error::InvalidStrategy {
                value: s.to_string(),
            }),
        }
    }
}

/// Settings shared by the client and server sides of a remoting setup.
///
/// Deserializable so hosts can embed it in their own configuration files.
///
/// # Examples
///
/// ```
/// use context_propagation::{HolderStrategy, PropagationConfig};
///
/// let config: PropagationConfig = serde_json::from_str(r#"{"strategy":"global"}"#).unwrap();
/// assert_eq!(config.strategy, HolderStrategy::Global);
///
/// let config: PropagationConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.strategy, HolderStrategy::ThreadLocal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Where the ambient context lives
    pub strategy: HolderStrategy,
}

impl PropagationConfig {
    /// Environment variable naming the holder strategy.
    pub const STRATEGY_ENV: &'static str = "CONTEXT_PROPAGATION_STRATEGY";

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStrategy`] if the variable holds an unknown value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStrategy`] if the variable holds an unknown value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let strategy = match lookup(Self::STRATEGY_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => HolderStrategy::default(),
        };
        Ok(Self { strategy })
    }

    /// Returns the holder selected by this configuration.
    pub fn holder(&self) -> Arc<dyn ContextHolder> {
        holder_for(self.strategy)
    }

    /// Builds the caller-side envelope factory.
    pub fn invocation_factory(&self) -> ContextPropagatingInvocationFactory {
        ContextPropagatingInvocationFactory::with_holder(self.holder())
    }

    /// Builds the callee-side executor with the default request factory.
    pub fn executor(&self) -> InvocationExecutor {
        InvocationExecutor::new().with_holder(self.holder())
    }
}
