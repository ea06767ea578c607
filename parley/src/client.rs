//! Outbound API collaborator interfaces.
//!
//! The framework never constructs an HTTP client of its own; it consumes a
//! [`ChatApi`] capability injected at build time, and resolves per-event
//! identity through an [`Authorizer`]. Both live behind `Arc<dyn _>` so
//! tests can swap fakes in.

use async_trait::async_trait;
use parley_core::BoxError;
use serde_json::Value;
use std::sync::Arc;

/// The result of resolving an event's workspace/user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization {
    /// Bot token for the resolved installation, preferred for outbound calls.
    pub bot_token: Option<String>,
    /// User token, used when no bot token is available.
    pub user_token: Option<String>,
    /// Bot id for the installation.
    pub bot_id: Option<String>,
    /// The bot's own user id.
    pub bot_user_id: Option<String>,
    /// Workspace id the event belongs to.
    pub team_id: Option<String>,
    /// User the event originated from.
    pub user_id: Option<String>,
    /// Enterprise id, for org-wide installations.
    pub enterprise_id: Option<String>,
}

impl Authorization {
    /// Token selection policy: bot token first, then user token, else none.
    pub fn token(&self) -> Option<&str> {
        self.bot_token.as_deref().or(self.user_token.as_deref())
    }
}

/// Identity fields probed from a raw payload, handed to the authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizeQuery {
    /// Workspace id, when the payload names one.
    pub team_id: Option<String>,
    /// Enterprise id, when the payload names one.
    pub enterprise_id: Option<String>,
    /// Originating user id, when the payload names one.
    pub user_id: Option<String>,
}

/// Resolves an [`Authorization`] for one event.
///
/// Failure short-circuits the event's entire chain: no middleware runs and
/// a tagged authorization error goes to the error sink.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Resolve identity and tokens for the given query.
    async fn authorize(&self, query: &AuthorizeQuery) -> Result<Authorization, BoxError>;
}

/// The injected outbound API capability.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a message payload to a conversation.
    async fn post_message(
        &self,
        channel: &str,
        payload: Value,
        token: Option<&str>,
    ) -> Result<Value, BoxError>;

    /// Resolve the identity behind a raw token.
    ///
    /// Used by the default single-token authorizer; custom [`Authorizer`]
    /// implementations are free to ignore it.
    async fn auth_lookup(&self, token: &str) -> Result<Authorization, BoxError>;
}

/// Default authorizer for apps configured with one fixed bot token.
///
/// Resolves identity through [`ChatApi::auth_lookup`] and attaches the
/// configured token as the bot token.
pub struct SingleTokenAuthorizer {
    token: String,
    client: Arc<dyn ChatApi>,
}

impl SingleTokenAuthorizer {
    /// Wrap a fixed token and the client used to look it up.
    pub fn new(token: impl Into<String>, client: Arc<dyn ChatApi>) -> Self {
        Self {
            token: token.into(),
            client,
        }
    }
}

#[async_trait]
impl Authorizer for SingleTokenAuthorizer {
    async fn authorize(&self, _query: &AuthorizeQuery) -> Result<Authorization, BoxError> {
        let mut authorization = self.client.auth_lookup(&self.token).await?;
        authorization.bot_token = Some(self.token.clone());
        Ok(authorization)
    }
}
