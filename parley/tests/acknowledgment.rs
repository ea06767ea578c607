//! The acknowledgment contract: at most once per event, observable exactly
//! once downstream, violations tagged and routed to the sink.

use parley::testing::ack_probe;
use parley::{Acknowledger, BoxError, Context, DispatchError, IncomingEvent, Next};
use serde_json::json;

mod common;
use common::test_app;

fn command_with_ack(ack: Acknowledger) -> IncomingEvent {
    IncomingEvent {
        body: json!({ "command": "/echo", "channel_id": "C1" }),
        ack,
        respond: None,
    }
}

#[tokio::test]
async fn first_ack_is_forwarded_once() {
    let (app, sink, _) = test_app();
    let (ack, sent) = ack_probe();

    app.command("/echo", |ctx: Context, _next: Next| async move {
        ctx.ack(Some(json!({ "text": "pong" }))).await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_with_ack(ack)).await;

    let responses = sent.lock().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0], Some(json!({ "text": "pong" })));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn second_ack_fails_without_disturbing_the_first() {
    let (app, sink, _) = test_app();
    let (ack, sent) = ack_probe();

    app.command("/echo", |ctx: Context, _next: Next| async move {
        ctx.ack(Some(json!({ "text": "first" }))).await?;
        // Propagates MultipleAcknowledgement to the sink.
        ctx.ack(Some(json!({ "text": "second" }))).await?;
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_with_ack(ack)).await;

    let responses = sent.lock().unwrap();
    assert_eq!(responses.len(), 1, "second response must never be sent");
    assert_eq!(responses[0], Some(json!({ "text": "first" })));

    let errors = sink.drain();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], DispatchError::MultipleAcknowledgement));
}

#[tokio::test]
async fn any_middleware_in_the_chain_may_ack() {
    let (app, sink, _) = test_app();
    let (ack, sent) = ack_probe();

    // The global middleware acks; the listener only proceeds the chain.
    app.use_middleware(|ctx: Context, next: Next| async move {
        ctx.ack(None).await?;
        next.proceed()?;
        Ok::<(), BoxError>(())
    });
    app.command("/echo", |ctx: Context, _next: Next| async move {
        assert!(ctx.acknowledger().acknowledged());
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_with_ack(ack)).await;

    assert_eq!(sent.lock().unwrap().len(), 1);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn swallowed_double_ack_still_skips_the_send() {
    let (app, sink, _) = test_app();
    let (ack, sent) = ack_probe();

    app.command("/echo", |ctx: Context, _next: Next| async move {
        ctx.ack(Some(json!({ "text": "only" }))).await?;
        let second = ctx.ack(Some(json!({ "text": "ignored" }))).await;
        assert!(matches!(
            second,
            Err(DispatchError::MultipleAcknowledgement)
        ));
        Ok::<(), BoxError>(())
    })
    .unwrap();

    app.dispatch(command_with_ack(ack)).await;

    assert_eq!(sent.lock().unwrap().len(), 1);
    assert!(sink.is_empty(), "a handled violation is not a chain failure");
}
