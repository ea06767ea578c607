//! The error sink.
//!
//! All dispatch-time errors for an app funnel into one handler, exactly
//! once per failing event. The sink is per-app state injected at
//! construction, not a process-wide global, so independent apps in one
//! process (and in one test) get independent sinks.

use futures::future::BoxFuture;
use parley_core::DispatchError;
use std::future::Future;

/// Receives every dispatch-time error for one app.
///
/// Closures implement this automatically:
///
/// ```rust,ignore
/// app.on_error(|error: DispatchError| async move {
///     eprintln!("dispatch failed: {error}");
/// });
/// ```
pub trait ErrorHandler: Send + Sync + 'static {
    /// Handle one dispatch error. Must not panic; the dispatcher has no
    /// recovery beyond this point.
    fn handle(&self, error: DispatchError) -> BoxFuture<'_, ()>;
}

impl<F, Fut> ErrorHandler for F
where
    F: Fn(DispatchError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, error: DispatchError) -> BoxFuture<'_, ()> {
        Box::pin(self(error))
    }
}

/// Default sink: log the error and keep the process alive.
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, error: DispatchError) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tracing::error!(%error, "dispatch error reached the default sink");
        })
    }
}
