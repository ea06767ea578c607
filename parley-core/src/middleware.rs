//! The middleware contract.
//!
//! A middleware receives the per-event context and a [`Next`] continuation
//! handle. It must do exactly one of:
//!
//! - signal [`Next::proceed`] once, letting the driver advance to the next
//!   middleware in the chain;
//! - return without proceeding, completing the chain early (the event is
//!   considered fully handled; remaining middleware never run);
//! - return an error, failing the chain (the error is routed to the error
//!   sink; remaining middleware never run).
//!
//! Signaling `proceed` twice is a protocol violation: the second call
//! returns [`ChainViolation::MultipleNext`], and the driver independently
//! fails the chain even if a middleware swallows that error.

use crate::error::{BoxError, ChainViolation};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Continuation handle passed to each middleware.
///
/// Cheap to clone; all clones share one latch scoped to a single middleware
/// invocation. The driver inspects the latch after the middleware resolves.
#[derive(Clone, Debug, Default)]
pub struct Next {
    signals: Arc<AtomicUsize>,
}

impl Next {
    /// Create a fresh, unsignaled continuation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that the chain should advance past this middleware.
    ///
    /// At most once per middleware invocation; a second call fails with
    /// [`ChainViolation::MultipleNext`] and leaves the first signal intact.
    pub fn proceed(&self) -> Result<(), ChainViolation> {
        if self.signals.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(ChainViolation::MultipleNext);
        }
        Ok(())
    }

    /// How many times `proceed` was attempted.
    pub(crate) fn signal_count(&self) -> usize {
        self.signals.load(Ordering::SeqCst)
    }
}

/// A single link in a middleware chain, generic over the context type.
///
/// The trait is object-safe so chains can hold heterogeneous middleware
/// behind `Arc<dyn Middleware<C>>`. Contexts are cheap clones (the argument
/// bag is `Arc`-backed), so each middleware receives its own handle.
///
/// Closures implement this automatically:
///
/// ```rust,ignore
/// let mw = |ctx: Context, next: Next| async move {
///     next.proceed()?;
///     Ok(())
/// };
/// ```
pub trait Middleware<C>: Send + Sync + 'static {
    /// Process one event. See the module docs for the proceed contract.
    fn handle(&self, ctx: C, next: Next) -> BoxFuture<'static, Result<(), BoxError>>;
}

impl<C, F, Fut> Middleware<C> for F
where
    C: Send + 'static,
    F: Fn(C, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn handle(&self, ctx: C, next: Next) -> BoxFuture<'static, Result<(), BoxError>> {
        Box::pin(self(ctx, next))
    }
}
