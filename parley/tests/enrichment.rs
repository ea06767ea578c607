//! Context enrichment: conversation resolution, `say` presence, token
//! selection, and conversation state.

use parley::testing::{FakeChatApi, RecordingSink};
use parley::{App, Authorization, BoxError, Context, MemoryStore, Next, Responder};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

mod common;
use common::{bot_auth, command_event, dialog_suggestion_event, message_event, test_app, test_app_with};

#[tokio::test]
async fn say_is_bound_to_the_command_channel() {
    let (app, sink, api) = test_app();

    app.command("/where", |ctx: Context, _next: Next| async move {
        ctx.say().expect("command has a channel").send("here").await?;
        ctx.ack(None).await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_event("/where", "C42")).await;

    let posts = api.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "C42");
    assert_eq!(posts[0].payload, json!({ "text": "here" }));
    assert_eq!(posts[0].token.as_deref(), Some("xoxb-test"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn dialog_options_have_no_say() {
    let (app, sink, _) = test_app();
    let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();

    app.options(
        parley::Constraint::new().callback_id("pick"),
        move |ctx: Context, _next: Next| {
            let record = record.clone();
            async move {
                record.lock().unwrap().push(ctx.say().is_some());
                Ok::<(), BoxError>(())
            }
        },
    )
    .unwrap();

    app.dispatch(dialog_suggestion_event("pick")).await;

    assert_eq!(*seen.lock().unwrap(), vec![false], "no channel, no say");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn responder_is_carried_onto_the_context() {
    let (app, sink, _) = test_app();

    let sent: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let record = sent.clone();
    let responder = Responder::new(move |payload| {
        let record = record.clone();
        Box::pin(async move {
            record.lock().unwrap().push(payload);
            Ok(())
        })
    });

    app.command("/defer", |ctx: Context, _next: Next| async move {
        let responder = ctx.responder().expect("command carries a responder").clone();
        responder.respond(json!({ "text": "later" })).await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    let mut event = command_event("/defer", "C1");
    event.respond = Some(responder);
    app.dispatch(event).await;

    assert_eq!(*sent.lock().unwrap(), vec![json!({ "text": "later" })]);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn events_without_a_responder_have_none() {
    let (app, sink, _) = test_app();

    app.command("/plain", |ctx: Context, _next: Next| async move {
        assert!(ctx.responder().is_none());
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_event("/plain", "C1")).await;
    assert!(sink.is_empty());
}

#[tokio::test]
async fn token_apps_resolve_identity_through_auth_lookup() {
    let api = FakeChatApi::with_authorization(Authorization {
        bot_user_id: Some("UBOT".into()),
        team_id: Some("T1".into()),
        ..Default::default()
    });
    let sink = RecordingSink::new();
    let app = App::builder()
        .token("xoxb-fixed")
        .client(api.clone())
        .error_handler(sink.clone())
        .build()
        .unwrap();

    app.message("ping", |ctx: Context, _next: Next| async move {
        // auth_lookup's identity, with the configured token attached.
        assert_eq!(ctx.authorization().bot_user_id.as_deref(), Some("UBOT"));
        assert_eq!(ctx.authorization().bot_token.as_deref(), Some("xoxb-fixed"));
        ctx.say().expect("message has a channel").send("pong").await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(message_event("ping", "C7")).await;

    let posts = api.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].token.as_deref(), Some("xoxb-fixed"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn user_token_is_selected_when_no_bot_token_exists() {
    let (app, sink, api) = test_app_with(Authorization {
        user_token: Some("xoxp-user".into()),
        ..Default::default()
    });

    app.message("ping", |ctx: Context, _next: Next| async move {
        ctx.say().expect("message has a channel").send("pong").await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(message_event("ping", "C7")).await;

    let posts = api.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].token.as_deref(), Some("xoxp-user"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn authorization_is_visible_on_the_context() {
    let (app, sink, _) = test_app();

    app.command("/who", |ctx: Context, _next: Next| async move {
        assert_eq!(ctx.authorization(), &bot_auth());
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_event("/who", "C1")).await;
    assert!(sink.is_empty());
}

#[tokio::test]
async fn conversation_state_round_trips_through_the_store() {
    let api = parley::testing::FakeChatApi::new();
    let sink = parley::testing::RecordingSink::new();
    let app = parley::App::builder()
        .authorizer(parley::testing::StaticAuthorizer(bot_auth()))
        .client(api)
        .conversation_store(MemoryStore::new())
        .error_handler(sink.clone())
        .build()
        .unwrap();

    app.command("/count", |ctx: Context, _next: Next| async move {
        let convo = ctx.conversation().expect("store plus channel");
        let count = convo
            .get()
            .await?
            .and_then(|state| state["count"].as_u64())
            .unwrap_or(0);
        convo.set(json!({ "count": count + 1 })).await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_event("/count", "C1")).await;
    app.dispatch(command_event("/count", "C1")).await;

    // A third dispatch observes the accumulated state.
    let observed: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let record = observed.clone();
    app.command("/peek", move |ctx: Context, _next: Next| {
        let record = record.clone();
        async move {
            let state = ctx.conversation().unwrap().get().await?.unwrap();
            record.lock().unwrap().push(state["count"].as_u64().unwrap());
            Ok::<(), BoxError>(())
        }
    })
    .unwrap();
    app.dispatch(command_event("/peek", "C1")).await;

    assert_eq!(*observed.lock().unwrap(), vec![2]);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn no_store_means_no_conversation_handle() {
    let (app, sink, _) = test_app();

    app.command("/x", |ctx: Context, _next: Next| async move {
        assert!(ctx.conversation().is_none());
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_event("/x", "C1")).await;
    assert!(sink.is_empty());
}
