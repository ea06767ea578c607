//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use parley::testing::{FakeChatApi, RecordingSink, StaticAuthorizer};
use parley::{App, Authorization, IncomingEvent};
use serde_json::json;

/// A bot-token authorization every event resolves to by default.
pub fn bot_auth() -> Authorization {
    Authorization {
        bot_token: Some("xoxb-test".into()),
        bot_user_id: Some("UBOT".into()),
        team_id: Some("T1".into()),
        ..Default::default()
    }
}

/// An app wired with a recording sink and a fake API client.
pub fn test_app() -> (App, RecordingSink, FakeChatApi) {
    test_app_with(bot_auth())
}

/// Same, but with a specific authorization result.
pub fn test_app_with(authorization: Authorization) -> (App, RecordingSink, FakeChatApi) {
    let api = FakeChatApi::new();
    let sink = RecordingSink::new();
    let app = App::builder()
        .authorizer(StaticAuthorizer(authorization))
        .client(api.clone())
        .error_handler(sink.clone())
        .build()
        .expect("app builds");
    (app, sink, api)
}

pub fn command_event(name: &str, channel: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "command": name,
        "channel_id": channel,
        "team_id": "T1",
        "user_id": "U1",
    }))
}

pub fn message_event(text: &str, channel: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "event": { "type": "message", "text": text, "channel": channel, "user": "U1" },
        "team_id": "T1",
    }))
}

pub fn block_action_event(action_id: &str, channel: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "type": "block_actions",
        "actions": [{ "action_id": action_id, "block_id": "B1" }],
        "channel": { "id": channel },
        "user": { "id": "U1" },
        "team": { "id": "T1" },
    }))
}

pub fn block_suggestion_event(action_id: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "type": "block_suggestion",
        "action_id": action_id,
        "team": { "id": "T1" },
    }))
}

pub fn dialog_suggestion_event(callback_id: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "type": "dialog_suggestion",
        "name": "field",
        "callback_id": callback_id,
        "team": { "id": "T1" },
    }))
}

pub fn view_submission_event(callback_id: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "type": "view_submission",
        "view": { "callback_id": callback_id },
        "team": { "id": "T1" },
        "user": { "id": "U1" },
    }))
}

pub fn view_closed_event(callback_id: &str) -> IncomingEvent {
    IncomingEvent::from_body(json!({
        "type": "view_closed",
        "view": { "callback_id": callback_id },
        "team": { "id": "T1" },
        "user": { "id": "U1" },
    }))
}

pub fn unknown_event() -> IncomingEvent {
    IncomingEvent::from_body(json!({ "something": "else" }))
}
