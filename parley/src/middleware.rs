//! Builtin middleware.

use crate::context::Context;
use futures::future::BoxFuture;
use parley_core::{BoxError, Middleware, Next};

/// Logs each event as it enters the chain, then proceeds.
///
/// Typically registered first via `app.use_middleware(LoggingMiddleware)`.
pub struct LoggingMiddleware;

impl Middleware<Context> for LoggingMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture<'static, Result<(), BoxError>> {
        Box::pin(async move {
            tracing::info!(
                kind = ?ctx.kind(),
                conversation = ctx.conversation_id().unwrap_or("-"),
                "processing event"
            );
            next.proceed()?;
            Ok(())
        })
    }
}
