//! Ambient storage for the current [`SecurityContext`].
//!
//! Code that cannot receive the context as a parameter reads it from a
//! [`ContextHolder`]. Two storage strategies are provided:
//!
//! - [`ThreadLocalContextHolder`]: one slot per thread (the default)
//! - [`GlobalContextHolder`]: one slot shared by the whole process
//!
//! A [`ContextGuard`] clears its holder when dropped, so a worker thread
//! never carries an identity into its next task.

use std::cell::RefCell;
use std::mem;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::HolderStrategy;
use crate::context::SecurityContext;

/// Get/set/clear access to the current security context.
pub trait ContextHolder: Send + Sync {
    /// Returns a copy of the current context (empty if none is set).
    fn context(&self) -> SecurityContext;

    /// Replaces the current context.
    fn set_context(&self, context: SecurityContext);

    /// Resets the current context to empty.
    fn clear_context(&self);

    /// The storage strategy this holder implements.
    fn strategy(&self) -> HolderStrategy;
}

thread_local! {
    static THREAD_CONTEXT: RefCell<SecurityContext> =
        const { RefCell::new(SecurityContext::empty()) };
}

/// Stores the context in a per-thread slot.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     ContextHolder, SecurityContext, ThreadLocalContextHolder, UsernamePasswordToken,
/// };
///
/// let holder = ThreadLocalContextHolder;
/// let alice = UsernamePasswordToken::new("alice", None);
/// holder.set_context(SecurityContext::with_authentication(alice));
/// assert!(!holder.context().is_empty());
///
/// holder.clear_context();
/// assert!(holder.context().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalContextHolder;

impl ContextHolder for ThreadLocalContextHolder {
    fn context(&self) -> SecurityContext {
        THREAD_CONTEXT.with(|cell| cell.borrow().clone())
    }

    fn set_context(&self, context: SecurityContext) {
        // The previous context is dropped after the slot is released: an
        // authentication's own drop may read the holder.
        let previous = THREAD_CONTEXT.with(|cell| cell.replace(context));
        drop(previous);
    }

    fn clear_context(&self) {
        self.set_context(SecurityContext::empty());
    }

    fn strategy(&self) -> HolderStrategy {
        HolderStrategy::ThreadLocal
    }
}

static GLOBAL_CONTEXT: RwLock<SecurityContext> = RwLock::new(SecurityContext::empty());

/// Stores the context in a single process-wide slot.
///
/// Every thread observes the same context. Suitable for single-user
/// processes such as rich clients, not for servers handling many callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalContextHolder;

impl ContextHolder for GlobalContextHolder {
    fn context(&self) -> SecurityContext {
        // A panic while holding the lock cannot leave a half-written context.
        GLOBAL_CONTEXT
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_context(&self, context: SecurityContext) {
        let previous = {
            let mut slot = GLOBAL_CONTEXT
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            mem::replace(&mut *slot, context)
        };
        // Dropped outside the lock, as for the thread-local slot.
        drop(previous);
    }

    fn clear_context(&self) {
        self.set_context(SecurityContext::empty());
    }

    fn strategy(&self) -> HolderStrategy {
        HolderStrategy::Global
    }
}

/// Returns the shared holder for a strategy.
pub(crate) fn holder_for(strategy: HolderStrategy) -> Arc<dyn ContextHolder> {
    match strategy {
        HolderStrategy::ThreadLocal => Arc::new(ThreadLocalContextHolder),
        HolderStrategy::Global => Arc::new(GlobalContextHolder),
    }
}

/// Clears a holder when dropped.
///
/// The clear runs on every exit path of the enclosing scope: normal
/// return, early `?` return, and unwinding.
///
/// # Examples
///
/// ```
/// use context_propagation::{
///     ContextGuard, ContextHolder, SecurityContext, ThreadLocalContextHolder,
///     UsernamePasswordToken,
/// };
///
/// let holder = ThreadLocalContextHolder;
/// {
///     let guard = ContextGuard::new(&holder);
///     let bob = UsernamePasswordToken::new("bob", None);
///     guard.install(SecurityContext::with_authentication(bob));
///     assert!(!holder.context().is_empty());
/// }
/// assert!(holder.context().is_empty());
/// ```
#[must_use = "the holder is cleared as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    holder: &'a dyn ContextHolder,
}

impl<'a> ContextGuard<'a> {
    /// Arms a guard over `holder` without changing its contents.
    pub fn new(holder: &'a dyn ContextHolder) -> Self {
        Self { holder }
    }

    /// Installs `context` in the guarded holder.
    pub fn install(&self, context: SecurityContext) {
        self.holder.set_context(context);
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.holder.clear_context();
        tracing::debug!(strategy = ?self.holder.strategy(), "Cleared security context");
    }
}
