//! The app: configuration, registration, and the dispatch entry point.
//!
//! An [`App`] is built once from its collaborators ([`AppBuilder`]), then
//! accepts listener registrations and dispatches events. Everything an app
//! needs is injected at construction; there is no ambient global state, so
//! multiple independent apps coexist in one process.
//!
//! Dispatch control flow per event: classify → select matching listener
//! middleware → enrich into a [`Context`] → run `[global middleware..,
//! matched listener middleware..]` through one [`Chain`] → route any
//! failure to the error sink, exactly once.

use crate::client::{Authorizer, ChatApi, SingleTokenAuthorizer};
use crate::context::Context;
use crate::enrich;
use crate::receiver::{EventSender, IncomingEvent, Receiver};
use crate::registry::{ListenerSlot, Registry};
use crate::sink::{ErrorHandler, LogErrorHandler};
use crate::store::ConversationStore;
use parley_core::payload::str_at;
use parley_core::{
    AppInitError, BoxError, Chain, ChainOutcome, Constraint, ConstraintError, DispatchError,
    EventKind, Matcher, Middleware, ViewKind, classify,
};
use std::sync::{Arc, RwLock};
use tracing::Instrument;

/// Configures and builds an [`App`].
///
/// Exactly one authorization method is required: a fixed `token` (resolved
/// through the client's auth lookup) or a custom [`Authorizer`]. The
/// outbound client is always required; receiver and conversation store are
/// optional collaborators.
#[derive(Default)]
pub struct AppBuilder {
    token: Option<String>,
    authorizer: Option<Arc<dyn Authorizer>>,
    client: Option<Arc<dyn ChatApi>>,
    store: Option<Arc<dyn ConversationStore>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    receiver: Option<Arc<dyn Receiver>>,
}

impl AppBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed bot token for every event.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a custom per-event authorizer.
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Inject the outbound API client. Required.
    pub fn client(mut self, client: impl ChatApi + 'static) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Enable conversation state, backed by the given store.
    pub fn conversation_store(mut self, store: impl ConversationStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Replace the default log-and-continue error sink.
    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Attach the transport receiver driven by [`App::start`] / [`App::stop`].
    pub fn receiver(mut self, receiver: impl Receiver + 'static) -> Self {
        self.receiver = Some(Arc::new(receiver));
        self
    }

    /// Validate the configuration and build the app.
    pub fn build(self) -> Result<App, AppInitError> {
        let client = self.client.ok_or(AppInitError::MissingClient)?;

        let authorizer = match (self.token, self.authorizer) {
            (Some(_), Some(_)) => return Err(AppInitError::ConflictingAuthorization),
            (None, None) => return Err(AppInitError::MissingAuthorization),
            (Some(token), None) => Arc::new(SingleTokenAuthorizer::new(token, client.clone())) as _,
            (None, Some(authorizer)) => authorizer,
        };

        Ok(App {
            inner: Arc::new(AppInner {
                authorizer,
                client,
                store: self.store,
                error_handler: RwLock::new(
                    self.error_handler.unwrap_or_else(|| Arc::new(LogErrorHandler)),
                ),
                receiver: self.receiver,
                global: RwLock::new(Vec::new()),
                registry: RwLock::new(Registry::default()),
            }),
        })
    }
}

pub(crate) struct AppInner {
    pub(crate) authorizer: Arc<dyn Authorizer>,
    pub(crate) client: Arc<dyn ChatApi>,
    pub(crate) store: Option<Arc<dyn ConversationStore>>,
    error_handler: RwLock<Arc<dyn ErrorHandler>>,
    receiver: Option<Arc<dyn Receiver>>,
    global: RwLock<Vec<Arc<dyn Middleware<Context>>>>,
    registry: RwLock<Registry>,
}

/// A configured dispatcher instance. Cheap to clone.
#[derive(Clone)]
pub struct App {
    pub(crate) inner: Arc<AppInner>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("global_middleware", &self.inner.global.read().unwrap().len())
            .field("listeners", &self.inner.registry.read().unwrap().len())
            .finish()
    }
}

impl App {
    /// Start configuring a new app.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Register a global middleware.
    ///
    /// Global middleware run for every dispatched event of every kind,
    /// before any listener middleware, in registration order.
    pub fn use_middleware(&self, middleware: impl Middleware<Context>) -> &Self {
        self.inner
            .global
            .write()
            .unwrap()
            .push(Arc::new(middleware));
        self
    }

    /// Register a listener for subscription events of the given type.
    pub fn event(
        &self,
        event_type: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::EVENT,
            Constraint::new().event_type(event_type),
            middleware,
        )
    }

    /// Register a listener for message events whose text matches `pattern`.
    pub fn message(
        &self,
        pattern: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::MESSAGE,
            Constraint::new()
                .event_type("message")
                .message_pattern(pattern),
            middleware,
        )
    }

    /// Register a listener for a slash command.
    pub fn command(
        &self,
        name: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::COMMAND,
            Constraint::new().command(name),
            middleware,
        )
    }

    /// Register a listener for interactive actions.
    ///
    /// Accepts a full [`Constraint`] or the string/pattern shorthand that
    /// constrains the action id.
    pub fn action(
        &self,
        constraint: impl Into<Constraint>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(ListenerSlot::ACTION, constraint.into(), middleware)
    }

    /// Register a listener for options (suggestion) requests.
    pub fn options(
        &self,
        constraint: impl Into<Constraint>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(ListenerSlot::OPTIONS, constraint.into(), middleware)
    }

    /// Register a listener for modal views with the given callback id.
    ///
    /// Fires for submissions and dismissals alike; use
    /// [`App::view_submission`] / [`App::view_closed`] to narrow.
    pub fn view(
        &self,
        callback_id: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::VIEW,
            Constraint::new().view_callback_id(callback_id),
            middleware,
        )
    }

    /// Register a listener for modal view submissions only.
    pub fn view_submission(
        &self,
        callback_id: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::VIEW,
            Constraint::new()
                .view_callback_id(callback_id)
                .view_kind(ViewKind::Submission),
            middleware,
        )
    }

    /// Register a listener for modal view dismissals only.
    pub fn view_closed(
        &self,
        callback_id: impl Into<Matcher>,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.register(
            ListenerSlot::VIEW,
            Constraint::new()
                .view_callback_id(callback_id)
                .view_kind(ViewKind::Closed),
            middleware,
        )
    }

    /// Replace the error sink for this app.
    pub fn on_error(&self, handler: impl ErrorHandler) -> &Self {
        *self.inner.error_handler.write().unwrap() = Arc::new(handler);
        self
    }

    fn register(
        &self,
        slot: ListenerSlot,
        constraint: Constraint,
        middleware: impl Middleware<Context>,
    ) -> Result<(), ConstraintError> {
        self.inner
            .registry
            .write()
            .unwrap()
            .register(slot, constraint, vec![Arc::new(middleware)])
    }

    /// Dispatch one inbound event through classification, enrichment, and
    /// the middleware chain.
    ///
    /// Never fails from the caller's perspective: dispatch-time errors go
    /// to the error sink, and unclassifiable events are dropped with a
    /// warning. Concurrent calls are independent; each event gets its own
    /// context, chain, and acknowledgment gate.
    pub async fn dispatch(&self, event: IncomingEvent) {
        let kind = classify(&event.body);
        if kind == EventKind::Unknown {
            tracing::warn!(
                payload_type = str_at(&event.body, "type").unwrap_or("-"),
                "dropping unclassifiable event"
            );
            return;
        }

        // Lock scopes end before the first await.
        let mut links = self.inner.global.read().unwrap().clone();
        links.extend(
            self.inner
                .registry
                .read()
                .unwrap()
                .select(&kind, &event.body),
        );

        let ctx = match enrich::build_context(&self.inner, kind, event).await {
            Ok(ctx) => ctx,
            Err(error) => {
                self.route_error(error).await;
                return;
            }
        };

        let span = ctx.span().clone();
        let outcome = Chain::new(links).run(ctx).instrument(span).await;
        if let ChainOutcome::Failed { error, .. } = outcome {
            self.route_error(error).await;
        }
    }

    pub(crate) async fn route_error(&self, error: DispatchError) {
        let handler = self.inner.error_handler.read().unwrap().clone();
        handler.handle(error).await;
    }

    /// Start the configured receiver, forwarding its result unchanged.
    pub async fn start(&self) -> Result<(), BoxError> {
        let receiver = self.receiver()?;
        receiver.start(EventSender::new(self.clone())).await
    }

    /// Stop the configured receiver, forwarding its result unchanged.
    pub async fn stop(&self) -> Result<(), BoxError> {
        let receiver = self.receiver()?;
        receiver.stop().await
    }

    fn receiver(&self) -> Result<Arc<dyn Receiver>, BoxError> {
        self.inner
            .receiver
            .clone()
            .ok_or_else(|| Box::new(AppInitError::MissingReceiver) as BoxError)
    }
}
