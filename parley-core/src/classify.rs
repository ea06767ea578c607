//! Event classification.
//!
//! Inbound payload shapes overlap: a `type` field alone is ambiguous across
//! action subtypes, and options requests share fields with the actions they
//! derive from. Classification is therefore a prioritized, total decision
//! procedure: rules are checked in a fixed order, the first match wins, and
//! anything unrecognized lands in [`EventKind::Unknown`].
//!
//! `Unknown` is terminal: unknown events are warn-logged and dropped by the
//! dispatcher, never matched and never surfaced as errors.

use crate::payload::{str_at, str_path};
use serde::Deserialize;
use serde_json::Value;

/// Subtypes of interactive action payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Block kit interaction (`block_actions`).
    BlockActions,
    /// Legacy attachment interaction (`interactive_message`).
    InteractiveMessage,
    /// Message shortcut (`message_action`).
    MessageAction,
    /// Dialog submission (`dialog_submission`).
    DialogSubmission,
}

impl ActionType {
    /// The wire value of the payload `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockActions => "block_actions",
            Self::InteractiveMessage => "interactive_message",
            Self::MessageAction => "message_action",
            Self::DialogSubmission => "dialog_submission",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "block_actions" => Some(Self::BlockActions),
            "interactive_message" => Some(Self::InteractiveMessage),
            "message_action" => Some(Self::MessageAction),
            "dialog_submission" => Some(Self::DialogSubmission),
            _ => None,
        }
    }
}

/// Where an options (suggestion) request originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionsSource {
    /// Block kit external select (`block_suggestion`), keyed by `action_id`.
    BlockSuggestion,
    /// Legacy attachment menu, keyed by `callback_id`.
    InteractiveMessage,
    /// Dialog external select, keyed by `callback_id` plus `name`.
    DialogSuggestion,
}

impl OptionsSource {
    /// The wire value of the payload `type` field, where one exists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockSuggestion => "block_suggestion",
            Self::InteractiveMessage => "interactive_message",
            Self::DialogSuggestion => "dialog_suggestion",
        }
    }
}

/// The two modal view interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ViewKind {
    /// A submitted view (`view_submission`).
    #[serde(rename = "view_submission")]
    Submission,
    /// A dismissed view (`view_closed`).
    #[serde(rename = "view_closed")]
    Closed,
}

impl ViewKind {
    /// The wire value of the payload `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submission => "view_submission",
            Self::Closed => "view_closed",
        }
    }
}

/// The closed set of incoming event kinds.
///
/// Exactly one kind is assigned per payload, by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A subscription event, subtyped by `event.type`.
    Event {
        /// The `event.type` value, e.g. `message` or `app_mention`.
        event_type: String,
    },
    /// A slash command invocation.
    Command {
        /// The command name including its leading slash.
        name: String,
    },
    /// An interactive action payload.
    Action(ActionType),
    /// An options (suggestion) request.
    Options(OptionsSource),
    /// A modal view submission, keyed by `view.callback_id`.
    ViewSubmission {
        /// The submitted view's callback id, when present.
        callback_id: Option<String>,
    },
    /// A modal view dismissal, keyed by `view.callback_id`.
    ViewClosed {
        /// The closed view's callback id, when present.
        callback_id: Option<String>,
    },
    /// Unclassifiable payload. Terminal: dropped with a warning.
    Unknown,
}

impl EventKind {
    /// Whether this is a message event (`event.type == "message"`).
    pub fn is_message(&self) -> bool {
        matches!(self, EventKind::Event { event_type } if event_type == "message")
    }

    /// The view kind, for the two modal view variants.
    pub fn view_kind(&self) -> Option<ViewKind> {
        match self {
            EventKind::ViewSubmission { .. } => Some(ViewKind::Submission),
            EventKind::ViewClosed { .. } => Some(ViewKind::Closed),
            _ => None,
        }
    }
}

/// Classify a raw payload into its event kind.
///
/// Pure function of the payload shape; never fails. Precedence, first match
/// wins:
///
/// 1. An `event` object → [`EventKind::Event`] keyed by `event.type`.
/// 2. A `command` field → [`EventKind::Command`].
/// 3. An options-request shape (`type` of `block_suggestion` /
///    `dialog_suggestion`, or `name` alongside `callback_id`) →
///    [`EventKind::Options`]. Subtype: an `action_id` (or a
///    `block_suggestion` type) means [`OptionsSource::BlockSuggestion`] even
///    when a legacy `callback_id` is also present; a `type` of
///    `interactive_message` means [`OptionsSource::InteractiveMessage`];
///    otherwise `callback_id` + `name` means
///    [`OptionsSource::DialogSuggestion`].
/// 4. A `type` of `view_submission` / `view_closed` → the view kinds.
/// 5. A known action `type` → [`EventKind::Action`].
/// 6. Anything else → [`EventKind::Unknown`].
pub fn classify(body: &Value) -> EventKind {
    if let Some(event) = body.get("event") {
        return match str_at(event, "type") {
            Some(event_type) => EventKind::Event {
                event_type: event_type.to_owned(),
            },
            None => EventKind::Unknown,
        };
    }

    if let Some(name) = str_at(body, "command") {
        return EventKind::Command {
            name: name.to_owned(),
        };
    }

    let body_type = str_at(body, "type");

    if is_options_shape(body, body_type) {
        return EventKind::Options(options_source(body, body_type));
    }

    match body_type {
        Some("view_submission") => {
            return EventKind::ViewSubmission {
                callback_id: str_path(body, &["view", "callback_id"]).map(str::to_owned),
            };
        }
        Some("view_closed") => {
            return EventKind::ViewClosed {
                callback_id: str_path(body, &["view", "callback_id"]).map(str::to_owned),
            };
        }
        _ => {}
    }

    if let Some(action) = body_type.and_then(ActionType::from_wire) {
        return EventKind::Action(action);
    }

    EventKind::Unknown
}

fn is_options_shape(body: &Value, body_type: Option<&str>) -> bool {
    matches!(body_type, Some("block_suggestion") | Some("dialog_suggestion"))
        || (body.get("name").is_some() && body.get("callback_id").is_some())
}

fn options_source(body: &Value, body_type: Option<&str>) -> OptionsSource {
    // When both action_id and callback_id appear, action_id wins: block
    // suggestion payloads may carry a legacy callback_id, while the legacy
    // sources never carry an action_id.
    if body_type == Some("block_suggestion") || body.get("action_id").is_some() {
        OptionsSource::BlockSuggestion
    } else if body_type == Some("interactive_message") {
        OptionsSource::InteractiveMessage
    } else {
        OptionsSource::DialogSuggestion
    }
}
