//! # parley - Middleware Dispatch for Chat Platform Events
//!
//! `parley` routes inbound webhook-style chat events (messages, actions,
//! commands, options requests, view submissions) through a chain of
//! user-supplied middleware, with single-acknowledgment and
//! single-error-propagation guarantees.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::{App, Context, Next};
//!
//! let app = App::builder()
//!     .token("xoxb-...")
//!     .client(my_client)
//!     .build()?;
//!
//! app.use_middleware(parley::middleware::LoggingMiddleware);
//!
//! app.command("/echo", |ctx: Context, _next: Next| async move {
//!     let text = ctx.body()["text"].as_str().unwrap_or("").to_owned();
//!     ctx.ack(Some(serde_json::json!({ "text": text }))).await?;
//!     Ok(())
//! })?;
//!
//! app.start().await?;
//! ```
//!
//! ## Control Flow
//!
//! For every event the receiver delivers: the payload is classified into
//! one [`EventKind`] (first matching precedence rule wins; unrecognized
//! shapes are dropped with a warning), listener registrations are matched
//! structurally against the classified event, the context is enriched
//! (authorization, conversation id, `say`), and one [`Chain`] of
//! `[global middleware.., matched listener middleware..]` runs in strict
//! registration order. Any failure anywhere is routed to this app's error
//! sink, exactly once per event.
//!
//! The transport (HTTP server, signature verification) and the outbound
//! API client are injected collaborators; see [`Receiver`] and [`ChatApi`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod app;
mod client;
mod context;
mod enrich;
mod receiver;
mod registry;
mod say;
mod sink;
mod store;

pub mod middleware;
pub mod testing;

// Core engine re-exports
pub use parley_core::{
    Acknowledger, ActionType, AppInitError, BoxError, Chain, ChainOutcome, ChainState,
    ChainViolation, Constraint, ConstraintError, DispatchError, EventKind, Matcher, Middleware,
    Next, OptionsSource, ViewKind, classify,
};

pub use app::{App, AppBuilder};
pub use client::{Authorization, AuthorizeQuery, Authorizer, ChatApi, SingleTokenAuthorizer};
pub use context::Context;
pub use receiver::{EventSender, IncomingEvent, Receiver, Responder};
pub use registry::ListenerSlot;
pub use say::{Say, SayMessage};
pub use sink::{ErrorHandler, LogErrorHandler};
pub use store::{ConversationHandle, ConversationStore, MemoryStore};
