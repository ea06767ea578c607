//! Listener constraints.
//!
//! A [`Constraint`] is a declarative matcher a listener is registered with.
//! Every field it specifies must match the classified event; absent fields
//! are wildcards. Matching is structural: a field only ever matches the
//! event kinds it is defined for, so an `action_id` constraint can never
//! match an interactive-message options request, and a `callback_id`
//! constraint never matches a block-suggestion options request (those key on
//! `action_id` alone).
//!
//! Constraints are validated when a listener is registered, not when events
//! arrive: unsupported fields fail fast with a [`ConstraintError`] instead
//! of silently producing a listener that can never fire.
//!
//! [`ConstraintError`]: crate::ConstraintError

use crate::classify::{ActionType, EventKind, OptionsSource, ViewKind};
use crate::error::ConstraintError;
use crate::payload::{action_id_of, block_id_of, str_at, str_path};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// A single string matcher: exact value or pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches the full string exactly.
    Exact(String),
    /// Matches wherever the pattern finds a match.
    Pattern(Regex),
}

impl Matcher {
    /// Test a candidate value against this matcher.
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Matcher::Exact(expected) => expected == value,
            Matcher::Pattern(pattern) => pattern.is_match(value),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Exact(value.to_owned())
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(value)
    }
}

impl From<Regex> for Matcher {
    fn from(pattern: Regex) -> Self {
        Matcher::Pattern(pattern)
    }
}

// The JSON constraint form carries plain strings; exact semantics.
impl<'de> Deserialize<'de> for Matcher {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Matcher::Exact)
    }
}

/// A declarative listener matcher.
///
/// Build one with the field methods, or deserialize the JSON form via
/// [`Constraint::from_value`] (unknown keys are rejected there).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Constraint {
    /// Block action / block suggestion id.
    pub action_id: Option<Matcher>,
    /// Legacy interactive callback id.
    pub callback_id: Option<Matcher>,
    /// Block id carrying the interacted element.
    pub block_id: Option<Matcher>,
    /// Subscription event type (`event.type`).
    pub event_type: Option<Matcher>,
    /// Message text pattern; only meaningful for message events.
    pub message_pattern: Option<Matcher>,
    /// Slash command name.
    pub command: Option<Matcher>,
    /// Modal view callback id.
    pub view_callback_id: Option<Matcher>,
    /// Restrict to submission or dismissal views.
    pub view_kind: Option<ViewKind>,
    /// Restrict to one action subtype.
    pub action_type: Option<ActionType>,
    /// Restrict to one options source.
    pub options_source: Option<OptionsSource>,
}

impl Constraint {
    /// An empty constraint (matches nothing until fields are added).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON constraint form.
    ///
    /// Unknown keys fail synchronously with [`ConstraintError::Invalid`], so
    /// a typo never registers a dead listener.
    pub fn from_value(value: Value) -> Result<Self, ConstraintError> {
        serde_json::from_value(value).map_err(|err| ConstraintError::Invalid(err.to_string()))
    }

    /// Constrain the block action / suggestion id.
    pub fn action_id(mut self, matcher: impl Into<Matcher>) -> Self {
        self.action_id = Some(matcher.into());
        self
    }

    /// Constrain the legacy callback id.
    pub fn callback_id(mut self, matcher: impl Into<Matcher>) -> Self {
        self.callback_id = Some(matcher.into());
        self
    }

    /// Constrain the block id.
    pub fn block_id(mut self, matcher: impl Into<Matcher>) -> Self {
        self.block_id = Some(matcher.into());
        self
    }

    /// Constrain the subscription event type.
    pub fn event_type(mut self, matcher: impl Into<Matcher>) -> Self {
        self.event_type = Some(matcher.into());
        self
    }

    /// Constrain the message text.
    pub fn message_pattern(mut self, matcher: impl Into<Matcher>) -> Self {
        self.message_pattern = Some(matcher.into());
        self
    }

    /// Constrain the slash command name.
    pub fn command(mut self, matcher: impl Into<Matcher>) -> Self {
        self.command = Some(matcher.into());
        self
    }

    /// Constrain the modal view callback id.
    pub fn view_callback_id(mut self, matcher: impl Into<Matcher>) -> Self {
        self.view_callback_id = Some(matcher.into());
        self
    }

    /// Restrict to submission or dismissal views.
    pub fn view_kind(mut self, kind: ViewKind) -> Self {
        self.view_kind = Some(kind);
        self
    }

    /// Restrict to one action subtype.
    pub fn action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = Some(action_type);
        self
    }

    /// Restrict to one options source.
    pub fn options_source(mut self, source: OptionsSource) -> Self {
        self.options_source = Some(source);
        self
    }

    /// Names of all fields this constraint specifies.
    ///
    /// Used by the registry to validate slot compatibility at registration.
    pub fn specified_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.action_id.is_some() {
            fields.push("action_id");
        }
        if self.callback_id.is_some() {
            fields.push("callback_id");
        }
        if self.block_id.is_some() {
            fields.push("block_id");
        }
        if self.event_type.is_some() {
            fields.push("event_type");
        }
        if self.message_pattern.is_some() {
            fields.push("message_pattern");
        }
        if self.command.is_some() {
            fields.push("command");
        }
        if self.view_callback_id.is_some() {
            fields.push("view_callback_id");
        }
        if self.view_kind.is_some() {
            fields.push("view_kind");
        }
        if self.action_type.is_some() {
            fields.push("action_type");
        }
        if self.options_source.is_some() {
            fields.push("options_source");
        }
        fields
    }

    /// Whether this constraint matches a classified event.
    ///
    /// Every specified field must match; absent fields are wildcards. Fields
    /// that are undefined for the event's kind never match.
    pub fn matches(&self, kind: &EventKind, body: &Value) -> bool {
        if let Some(expected) = self.action_type {
            if !matches!(kind, EventKind::Action(actual) if *actual == expected) {
                return false;
            }
        }

        if let Some(expected) = self.options_source {
            if !matches!(kind, EventKind::Options(actual) if *actual == expected) {
                return false;
            }
        }

        if let Some(matcher) = &self.command {
            let EventKind::Command { name } = kind else {
                return false;
            };
            if !matcher.is_match(name) {
                return false;
            }
        }

        if let Some(matcher) = &self.event_type {
            let EventKind::Event { event_type } = kind else {
                return false;
            };
            if !matcher.is_match(event_type) {
                return false;
            }
        }

        if let Some(matcher) = &self.message_pattern {
            if !kind.is_message() {
                return false;
            }
            match str_path(body, &["event", "text"]) {
                Some(text) if matcher.is_match(text) => {}
                _ => return false,
            }
        }

        if let Some(matcher) = &self.action_id {
            if !action_id_applies(kind) {
                return false;
            }
            match action_id_of(body) {
                Some(id) if matcher.is_match(id) => {}
                _ => return false,
            }
        }

        if let Some(matcher) = &self.block_id {
            if !action_id_applies(kind) {
                return false;
            }
            match block_id_of(body) {
                Some(id) if matcher.is_match(id) => {}
                _ => return false,
            }
        }

        if let Some(matcher) = &self.callback_id {
            if !callback_id_applies(kind) {
                return false;
            }
            match str_at(body, "callback_id") {
                Some(id) if matcher.is_match(id) => {}
                _ => return false,
            }
        }

        if let Some(expected) = self.view_kind {
            if kind.view_kind() != Some(expected) {
                return false;
            }
        }

        if let Some(matcher) = &self.view_callback_id {
            let callback_id = match kind {
                EventKind::ViewSubmission { callback_id } => callback_id,
                EventKind::ViewClosed { callback_id } => callback_id,
                _ => return false,
            };
            match callback_id {
                Some(id) if matcher.is_match(id) => {}
                _ => return false,
            }
        }

        true
    }
}

// Shorthand forms for action/options registration: a bare string or pattern
// constrains the action id, mirroring `app.action("approve", ..)`.

impl From<&str> for Constraint {
    fn from(action_id: &str) -> Self {
        Constraint::new().action_id(action_id)
    }
}

impl From<String> for Constraint {
    fn from(action_id: String) -> Self {
        Constraint::new().action_id(action_id)
    }
}

impl From<Regex> for Constraint {
    fn from(pattern: Regex) -> Self {
        Constraint::new().action_id(pattern)
    }
}

impl From<Matcher> for Constraint {
    fn from(action_id: Matcher) -> Self {
        Constraint::new().action_id(action_id)
    }
}

/// Kinds whose payloads key on `action_id` / `block_id`.
fn action_id_applies(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Action(ActionType::BlockActions)
            | EventKind::Options(OptionsSource::BlockSuggestion)
    )
}

/// Kinds whose payloads key on a legacy `callback_id`.
///
/// Block-suggestion options never match on `callback_id`: even when a legacy
/// id is present on the payload, those requests key on `action_id`.
fn callback_id_applies(kind: &EventKind) -> bool {
    match kind {
        EventKind::Action(_) => true,
        EventKind::Options(source) => *source != OptionsSource::BlockSuggestion,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use serde_json::json;

    #[test]
    fn action_id_matches_block_actions_only() {
        let constraint = Constraint::new().action_id("approve");

        let action = json!({ "type": "block_actions", "actions": [{ "action_id": "approve" }] });
        assert!(constraint.matches(&classify(&action), &action));

        // Same action_id, but an options request: structural mismatch only
        // when the source is not block_suggestion.
        let options = json!({ "type": "block_suggestion", "action_id": "approve" });
        assert!(constraint.matches(&classify(&options), &options));

        let dialog = json!({ "type": "dialog_suggestion", "name": "n", "callback_id": "cb" });
        assert!(!constraint.matches(&classify(&dialog), &dialog));
    }

    #[test]
    fn callback_id_never_matches_block_suggestion() {
        let constraint = Constraint::new().callback_id("legacy");
        let body = json!({
            "type": "block_suggestion",
            "action_id": "a1",
            "callback_id": "legacy",
        });
        assert!(!constraint.matches(&classify(&body), &body));
    }

    #[test]
    fn callback_id_disambiguates_action_subtypes() {
        let constraint = Constraint::new()
            .callback_id("cb")
            .action_type(ActionType::MessageAction);

        let shortcut = json!({ "type": "message_action", "callback_id": "cb" });
        assert!(constraint.matches(&classify(&shortcut), &shortcut));

        let dialog = json!({ "type": "dialog_submission", "callback_id": "cb" });
        assert!(!constraint.matches(&classify(&dialog), &dialog));
    }

    #[test]
    fn pattern_matchers() {
        let constraint = Constraint::new().command(Regex::new("^/deploy-.+$").unwrap());
        let body = json!({ "command": "/deploy-west" });
        assert!(constraint.matches(&classify(&body), &body));

        let other = json!({ "command": "/status" });
        assert!(!constraint.matches(&classify(&other), &other));
    }

    #[test]
    fn message_pattern_requires_message_event() {
        let constraint = Constraint::new().message_pattern(Regex::new("hello").unwrap());

        let message = json!({ "event": { "type": "message", "text": "well hello there" } });
        assert!(constraint.matches(&classify(&message), &message));

        let mention = json!({ "event": { "type": "app_mention", "text": "hello" } });
        assert!(!constraint.matches(&classify(&mention), &mention));

        let no_text = json!({ "event": { "type": "message" } });
        assert!(!constraint.matches(&classify(&no_text), &no_text));
    }

    #[test]
    fn absent_fields_are_wildcards() {
        let constraint = Constraint::new().event_type("reaction_added");
        let body = json!({
            "event": { "type": "reaction_added", "item": { "channel": "C1" } },
        });
        assert!(constraint.matches(&classify(&body), &body));
    }

    #[test]
    fn json_form_rejects_unknown_keys() {
        let err = Constraint::from_value(json!({ "acton_id": "typo" })).unwrap_err();
        assert!(matches!(err, ConstraintError::Invalid(_)));

        let ok = Constraint::from_value(json!({ "action_id": "a1" })).unwrap();
        assert!(ok.action_id.is_some());
    }

    #[test]
    fn view_kind_separates_submission_from_closed() {
        let submit_only = Constraint::new()
            .view_callback_id("modal-1")
            .view_kind(ViewKind::Submission);

        let submit = json!({ "type": "view_submission", "view": { "callback_id": "modal-1" } });
        assert!(submit_only.matches(&classify(&submit), &submit));

        let closed = json!({ "type": "view_closed", "view": { "callback_id": "modal-1" } });
        assert!(!submit_only.matches(&classify(&closed), &closed));

        let closed_only = Constraint::new().view_kind(ViewKind::Closed);
        assert!(closed_only.matches(&classify(&closed), &closed));
        assert!(!closed_only.matches(&classify(&submit), &submit));
    }

    #[test]
    fn view_callback_id_matches_both_view_kinds() {
        let constraint = Constraint::new().view_callback_id("modal-1");

        let submit = json!({ "type": "view_submission", "view": { "callback_id": "modal-1" } });
        assert!(constraint.matches(&classify(&submit), &submit));

        let closed = json!({ "type": "view_closed", "view": { "callback_id": "modal-1" } });
        assert!(constraint.matches(&classify(&closed), &closed));

        let other = json!({ "type": "view_submission", "view": { "callback_id": "modal-2" } });
        assert!(!constraint.matches(&classify(&other), &other));
    }
}
