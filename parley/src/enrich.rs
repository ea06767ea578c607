//! The context enrichment pipeline.
//!
//! Runs after classification and listener selection, before any middleware:
//!
//! 1. Resolve authorization through the injected [`Authorizer`]. Failure
//!    short-circuits the whole chain: no middleware runs and a tagged
//!    authorization error goes to the sink.
//! 2. Probe the payload for a conversation id.
//! 3. Bind `say` iff an id resolved, using the token selection policy
//!    (bot token first, then user token).
//! 4. Bind conversation state accessors iff a store is configured as well.
//! 5. Open the per-event tracing span.
//!
//! [`Authorizer`]: crate::client::Authorizer

use crate::app::AppInner;
use crate::client::AuthorizeQuery;
use crate::context::{Context, ContextInner};
use crate::receiver::IncomingEvent;
use crate::say::Say;
use crate::store::ConversationHandle;
use parley_core::payload::{conversation_id, str_at, str_path};
use parley_core::{DispatchError, EventKind};
use serde_json::Value;

/// Probe the identity fields the authorizer needs.
///
/// Payloads name their workspace and user in several shapes depending on
/// kind; first present wins for each field.
pub(crate) fn authorize_query(body: &Value) -> AuthorizeQuery {
    AuthorizeQuery {
        team_id: str_at(body, "team_id")
            .or_else(|| str_path(body, &["team", "id"]))
            .map(str::to_owned),
        enterprise_id: str_at(body, "enterprise_id")
            .or_else(|| str_path(body, &["enterprise", "id"]))
            .or_else(|| str_path(body, &["team", "enterprise_id"]))
            .map(str::to_owned),
        user_id: str_at(body, "user_id")
            .or_else(|| str_path(body, &["user", "id"]))
            .or_else(|| str_path(body, &["event", "user"]))
            .map(str::to_owned),
    }
}

/// Build the argument bag for one classified event.
pub(crate) async fn build_context(
    app: &AppInner,
    kind: EventKind,
    event: IncomingEvent,
) -> Result<Context, DispatchError> {
    let IncomingEvent { body, ack, respond } = event;

    let query = authorize_query(&body);
    let authorization = app
        .authorizer
        .authorize(&query)
        .await
        .map_err(DispatchError::Authorization)?;

    let conversation = conversation_id(&body);

    let say = conversation.as_ref().map(|channel| {
        Say::new(
            channel.clone(),
            authorization.token().map(str::to_owned),
            app.client.clone(),
        )
    });

    let convo = match (&conversation, &app.store) {
        (Some(id), Some(store)) => Some(ConversationHandle::new(id.clone(), store.clone())),
        _ => None,
    };

    let span = tracing::info_span!(
        "event",
        kind = ?kind,
        conversation = conversation.as_deref().unwrap_or("-"),
    );

    Ok(Context::new(ContextInner {
        body,
        kind,
        authorization,
        conversation_id: conversation,
        say,
        ack,
        respond,
        client: app.client.clone(),
        convo,
        span,
    }))
}
