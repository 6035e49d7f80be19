use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{ Json, Router };
use serde_json::{ json, Value };
use tokio::net::TcpListener;
use tokio::sync::{ oneshot, Mutex };

use dsa_instructor::client::fallback::OFFLINE_REPLY;
use dsa_instructor::client::repl::{ Repl, FAILED_REPLY };
use dsa_instructor::client::session::ChatSession;
use dsa_instructor::client::store::{ LocalStore, MEMORY_KEY, MESSAGES_KEY };
use dsa_instructor::client::{ ClientError, RelayClient, NO_REPLY };
use dsa_instructor::models::chat::{ Message, Role };

#[derive(Clone)]
enum RelayReply {
    Ok(Value),
    Status(StatusCode, Value),
    Stall(Duration),
}

#[derive(Clone)]
struct RelayState {
    replies: Arc<Mutex<VecDeque<RelayReply>>>,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl RelayState {
    fn with_replies(replies: Vec<RelayReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn calls(&self) -> usize {
        self.seen.lock().await.len()
    }
}

async fn chat_handler(State(state): State<RelayState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.seen.lock().await.push(body);
    let reply = state.replies
        .lock().await
        .pop_front()
        .unwrap_or(RelayReply::Status(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "exhausted" })));
    match reply {
        RelayReply::Ok(value) => (StatusCode::OK, Json(value)),
        RelayReply::Status(status, value) => (status, Json(value)),
        RelayReply::Stall(duration) => {
            tokio::time::sleep(duration).await;
            (StatusCode::OK, Json(json!({ "reply": "too late" })))
        }
    }
}

async fn spawn_relay(state: RelayState) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let app = Router::new().route("/chat", post(chat_handler)).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
    let local_addr = listener.local_addr().expect("listener address should resolve");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        server.await.expect("relay mock should run");
    });

    (format!("http://{local_addr}"), shutdown_tx, server_task)
}

fn temp_store(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dsa-chat-test-{}-{}.json", tag, uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn retries_failures_then_succeeds() {
    let state = RelayState::with_replies(vec![
        RelayReply::Status(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })),
        RelayReply::Status(StatusCode::BAD_GATEWAY, json!({})),
        RelayReply::Ok(json!({ "reply": "Use two pointers." })),
    ]);
    let (url, shutdown_tx, server_task) = spawn_relay(state.clone()).await;

    let client = RelayClient::new(&url, Duration::from_secs(5), 2);
    let reply = client.send("pair sum?", &[]).await.expect("third attempt should succeed");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert_eq!(reply, "Use two pointers.");
    assert_eq!(state.calls().await, 3);
    assert_eq!(state.seen.lock().await[0], json!({ "prompt": "pair sum?" }));
}

#[tokio::test]
async fn gives_up_after_retries() {
    let state = RelayState::with_replies(vec![
        RelayReply::Status(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "first" })),
        RelayReply::Status(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "second" })),
        RelayReply::Ok(json!({ "reply": "never reached" })),
    ]);
    let (url, shutdown_tx, server_task) = spawn_relay(state.clone()).await;

    let client = RelayClient::new(&url, Duration::from_secs(5), 1);
    let err = client.send("q", &[]).await.expect_err("both attempts should fail");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "second");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.calls().await, 2);
}

#[tokio::test]
async fn timeout_aborts_without_retry() {
    let state = RelayState::with_replies(vec![
        RelayReply::Stall(Duration::from_secs(2)),
        RelayReply::Ok(json!({ "reply": "should not be requested" })),
    ]);
    let (url, _shutdown_tx, server_task) = spawn_relay(state.clone()).await;

    let client = RelayClient::new(&url, Duration::from_millis(200), 3);
    let err = client.send("q", &[]).await.expect_err("attempt should time out");
    server_task.abort();

    assert!(matches!(err, ClientError::Timeout), "got {err:?}");
    assert_eq!(state.calls().await, 1);
}

#[tokio::test]
async fn missing_reply_field_uses_placeholder() {
    let state = RelayState::with_replies(vec![RelayReply::Ok(json!({ "success": true }))]);
    let (url, shutdown_tx, server_task) = spawn_relay(state).await;

    let client = RelayClient::new(&url, Duration::from_secs(5), 0);
    let reply = client.send("q", &[]).await.expect("call should succeed");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert_eq!(reply, NO_REPLY);
}

#[tokio::test]
async fn repl_records_conversation_and_sends_history() {
    let state = RelayState::with_replies(vec![
        RelayReply::Ok(json!({ "reply": "Welcome, Lin!" })),
        RelayReply::Ok(json!({ "reply": "Start with BFS." })),
    ]);
    let (url, shutdown_tx, server_task) = spawn_relay(state.clone()).await;
    let path = temp_store("repl");

    let session = ChatSession::load(LocalStore::open(&path).expect("store should open"));
    let mut repl = Repl::new(session, RelayClient::new(&url, Duration::from_secs(5), 0), true);

    let first = repl.handle_line("my name is Lin, i want to learn graphs").await.unwrap();
    assert_eq!(first.as_deref(), Some("Welcome, Lin!"));
    let second = repl.handle_line("  where do I start?  ").await.unwrap();
    assert_eq!(second.as_deref(), Some("Start with BFS."));
    assert_eq!(repl.handle_line("   ").await.unwrap().as_deref(), Some(""));

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    let seen = state.seen.lock().await.clone();
    assert_eq!(seen[1]["prompt"], "where do I start?");
    assert_eq!(seen[1]["history"].as_array().map(Vec::len), Some(2));

    assert_eq!(repl.session().memory().name, "Lin,");
    assert_eq!(repl.session().memory().goal, "graphs");

    let store = LocalStore::open(&path).expect("store should reopen");
    let persisted: Vec<Message> = store.get(MESSAGES_KEY).expect("messages should persist");
    assert_eq!(persisted.len(), 4);
    assert_eq!(persisted[3].role, Role::Assistant);

    assert_eq!(repl.handle_line("/clear").await.unwrap().as_deref(), Some("Chat cleared."));
    let store = LocalStore::open(&path).expect("store should reopen");
    assert!(!store.contains(MESSAGES_KEY));
    assert!(!store.contains(MEMORY_KEY));
    assert!(repl.handle_line("/quit").await.unwrap().is_none());
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn repl_falls_back_when_relay_is_unreachable() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
    let url = format!("http://{}", listener.local_addr().expect("address should resolve"));
    drop(listener);

    let path = temp_store("offline");
    let session = ChatSession::load(LocalStore::open(&path).expect("store should open"));
    let mut repl = Repl::new(session, RelayClient::new(&url, Duration::from_secs(2), 1), false);

    let output = repl.handle_line("hello there").await.unwrap().expect("should produce output");
    assert!(output.starts_with(&format!("[{}]", FAILED_REPLY)));
    assert!(output.ends_with(OFFLINE_REPLY));
    assert_eq!(repl.session().messages().last().map(|m| m.text.as_str()), Some(OFFLINE_REPLY));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn repl_reports_relay_errors() {
    let state = RelayState::with_replies(vec![RelayReply::Status(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": "API rate limit exceeded - please wait a moment" }),
    )]);
    let (url, shutdown_tx, server_task) = spawn_relay(state).await;
    let path = temp_store("status");

    let session = ChatSession::load(LocalStore::open(&path).expect("store should open"));
    let mut repl = Repl::new(session, RelayClient::new(&url, Duration::from_secs(5), 0), false);
    let output = repl.handle_line("dp?").await.unwrap().expect("should produce output");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert_eq!(output, format!("[API rate limit exceeded - please wait a moment]\n{}", FAILED_REPLY));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn banner_shows_persisted_theme_and_history() {
    let path = temp_store("banner");
    let client = || RelayClient::new("http://127.0.0.1:9", Duration::from_secs(1), 0);

    let mut repl = Repl::new(ChatSession::load(LocalStore::open(&path).expect("store should open")), client(), false);
    let banner = repl.banner();
    assert!(banner.contains("Theme: light"));
    assert!(banner.ends_with("Say Hi! What do you want to learn about DSA today?"));
    assert_eq!(repl.handle_line("/theme").await.unwrap().as_deref(), Some("Theme: dark"));

    let mut session = ChatSession::load(LocalStore::open(&path).expect("store should reopen"));
    session.record_user("what is a heap?").expect("message should persist");
    let repl = Repl::new(session, client(), false);
    let banner = repl.banner();
    assert!(banner.contains("Theme: dark"));
    assert!(banner.ends_with("user> what is a heap?"));
    std::fs::remove_file(path).ok();
}
