// End-to-end dispatch: lookups + transport + a local stub of the Web API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
use serde_json::{json, Map, Value};
use slackline_core::config::ApiConfig;
use slackline_protocol::frames::Frame;
use slackline_sends::{
    ImOpenError, InMemoryLookups, MessageDispatcher, RtmConnection, SendError, Transport,
    TransportError,
};

#[derive(Default)]
struct RecordingTransport {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingTransport {
    fn payloads(&self) -> Vec<Value> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| serde_json::from_str(&f.payload).unwrap())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn cast(&self, frame: Frame) -> Result<(), TransportError> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    calls: Arc<AtomicUsize>,
    last_form: Arc<Mutex<HashMap<String, String>>>,
}

async fn im_open(
    State(stub): State<Stub>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_form.lock().unwrap() = form;
    (stub.status, Json(stub.reply.clone()))
}

/// Serve `reply` with 200 OK for every `POST /api/im.open` on an ephemeral port.
async fn spawn_stub(reply: Value) -> (ApiConfig, Stub) {
    spawn_stub_with_status(StatusCode::OK, reply).await
}

async fn spawn_stub_with_status(status: StatusCode, reply: Value) -> (ApiConfig, Stub) {
    let stub = Stub {
        status,
        reply,
        calls: Arc::new(AtomicUsize::new(0)),
        last_form: Arc::new(Mutex::new(HashMap::new())),
    };
    let app = Router::new()
        .route("/api/im.open", post(im_open))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (ApiConfig::new(format!("http://{addr}")), stub)
}

fn connection() -> (RtmConnection, Arc<RecordingTransport>) {
    let lookups = InMemoryLookups::from_json(
        r#"{
            "channels": [{"id": "C123", "name": "general"}],
            "users": [
                {"id": "U1", "name": "alice"},
                {"id": "U2", "name": "bob"},
                {"id": "U3", "name": "carol"}
            ],
            "ims": [{"id": "D456", "user": "U1"}]
        }"#,
    )
    .unwrap();
    let transport = Arc::new(RecordingTransport::default());
    let conn = RtmConnection::new("xoxb-secret", transport.clone(), Arc::new(lookups));
    (conn, transport)
}

#[tokio::test]
async fn channel_name_message() {
    let (api, stub) = spawn_stub(json!({"ok": true, "channel": {"id": "unused"}})).await;
    let (conn, transport) = connection();

    MessageDispatcher::new(api)
        .send_message("hello", "#general", None, &conn)
        .await
        .unwrap();

    assert_eq!(
        transport.payloads(),
        vec![json!({"type": "message", "text": "hello", "channel": "C123"})]
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ghost_channel_sends_nothing() {
    let (api, _stub) = spawn_stub(json!({"ok": true})).await;
    let (conn, transport) = connection();

    let err = MessageDispatcher::new(api)
        .send_message("hello", "#ghost", None, &conn)
        .await
        .unwrap_err();

    assert!(matches!(err, SendError::TargetNotFound { .. }));
    assert!(err.to_string().contains("ghost"));
    assert!(transport.payloads().is_empty());
}

#[tokio::test]
async fn existing_dm_needs_no_http() {
    let (api, stub) = spawn_stub(json!({"ok": true, "channel": {"id": "unused"}})).await;
    let (conn, transport) = connection();

    MessageDispatcher::new(api)
        .send_message("hey", "@alice", None, &conn)
        .await
        .unwrap();

    assert_eq!(transport.payloads()[0]["channel"], "D456");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_dm_is_opened_over_http() {
    let (api, stub) = spawn_stub(json!({"ok": true, "channel": {"id": "D789"}})).await;
    let (conn, transport) = connection();

    MessageDispatcher::new(api)
        .send_message("hey", "@bob", Some(json!(42)), &conn)
        .await
        .unwrap();

    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    let form = stub.last_form.lock().unwrap().clone();
    assert_eq!(form.get("token").map(String::as_str), Some("xoxb-secret"));
    assert_eq!(form.get("user").map(String::as_str), Some("U2"));

    assert_eq!(
        transport.payloads(),
        vec![json!({"type": "message", "text": "hey", "channel": "D789", "id": 42})]
    );
}

#[tokio::test]
async fn raw_user_id_opens_dm_by_user() {
    let (api, stub) = spawn_stub(json!({"ok": true, "channel": {"id": "D790"}})).await;
    let (conn, transport) = connection();

    MessageDispatcher::new(api)
        .send_message("yo", "U2", None, &conn)
        .await
        .unwrap();

    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.payloads()[0]["channel"], "D790");
}

#[tokio::test]
async fn dm_open_application_error_is_returned() {
    let (api, stub) = spawn_stub(json!({"ok": false, "error": "user_not_found"})).await;
    let (conn, transport) = connection();

    let err = MessageDispatcher::new(api)
        .send_message("hey", "@carol", None, &conn)
        .await
        .unwrap_err();

    match err {
        SendError::DmOpen(ImOpenError::Api { error, body }) => {
            assert_eq!(error, "user_not_found");
            assert_eq!(body, json!({"ok": false, "error": "user_not_found"}));
        }
        other => panic!("expected DmOpen(Api), got {other:?}"),
    }
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    assert!(transport.payloads().is_empty());
}

#[tokio::test]
async fn non_2xx_reply_is_transport_error() {
    let (api, stub) = spawn_stub_with_status(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"ok": false, "error": "ratelimited"}),
    )
    .await;
    let (conn, transport) = connection();

    let err = MessageDispatcher::new(api)
        .send_message("hey", "@bob", None, &conn)
        .await
        .unwrap_err();

    match &err {
        SendError::DmOpen(ImOpenError::Transport(reason)) => {
            assert!(reason.contains("429"), "unexpected reason: {reason}");
        }
        other => panic!("expected DmOpen(Transport), got {other:?}"),
    }
    assert!(!err.is_caller_error());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    assert!(transport.payloads().is_empty());
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (conn, transport) = connection();
    let err = MessageDispatcher::new(ApiConfig::new(format!("http://{addr}")))
        .send_message("hey", "@bob", None, &conn)
        .await
        .unwrap_err();

    assert!(matches!(err, SendError::DmOpen(ImOpenError::Transport(_))));
    assert!(!err.is_caller_error());
    assert!(transport.payloads().is_empty());
}

#[tokio::test]
async fn message_to_plain_id_carries_correlation_id() {
    let (conn, transport) = connection();
    MessageDispatcher::new(ApiConfig::default())
        .send_message("hi", "C999", Some(json!(42)), &conn)
        .await
        .unwrap();

    let sent = &transport.payloads()[0];
    assert_eq!(sent["id"], 42);
    assert_eq!(sent["text"], "hi");
    assert_eq!(sent["channel"], "C999");
}

#[tokio::test]
async fn thread_reply_carries_thread_ts() {
    let (conn, transport) = connection();
    MessageDispatcher::new(ApiConfig::default())
        .reply_in_thread("ack", "#general", "1700000000.000100", None, &conn)
        .await
        .unwrap();

    assert_eq!(
        transport.payloads(),
        vec![json!({
            "type": "message",
            "text": "ack",
            "channel": "C123",
            "thread_ts": "1700000000.000100"
        })]
    );
}

#[test]
fn typing_ping_presence_and_raw() {
    let (conn, transport) = connection();
    let dispatcher = MessageDispatcher::new(ApiConfig::default());

    dispatcher.indicate_typing("C1", &conn).unwrap();

    let mut data = Map::new();
    data.insert("extra".into(), json!(1));
    dispatcher.send_ping(data, &conn).unwrap();

    dispatcher
        .subscribe_presence(vec!["U1".into(), "U2".into()], &conn)
        .unwrap();

    dispatcher
        .send_raw(&json!({"type": "pong", "reply_to": 7}), &conn)
        .unwrap();

    assert_eq!(
        transport.payloads(),
        vec![
            json!({"type": "typing", "channel": "C1"}),
            json!({"type": "ping", "extra": 1}),
            json!({"type": "presence_sub", "ids": ["U1", "U2"]}),
            json!({"type": "pong", "reply_to": 7}),
        ]
    );
}
