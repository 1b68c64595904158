use alert_logger::domain::LogRecord;
use alert_logger::domain::repositories::LogRepository;
use alert_logger::repositories::MemoryLogRepository;
use alert_logger::{AppState, router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestApp {
    addr: SocketAddr,
    state: AppState,
    repo: Arc<MemoryLogRepository>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect_ws(&self) -> Client {
        let expected = self.state.connections.len() + 1;
        let (socket, response) = connect_async(format!("ws://{}/ws/logs", self.addr))
            .await
            .expect("Failed to connect");
        assert_eq!(response.status(), 101);

        // registration happens after the handshake completes
        for _ in 0..100 {
            if self.state.connections.len() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(self.state.connections.len(), expected);
        socket
    }

    async fn insert(&self, content: &str) -> LogRecord {
        let mut payload = Map::new();
        payload.insert("content".into(), json!(content));
        payload.insert("appName".into(), json!("Test"));
        let record = LogRecord::from_payload(&payload);
        self.repo.insert(&record).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        record
    }
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryLogRepository::new());
    let state = AppState::new(repo.clone());
    let app = router(state.clone(), &[]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { addr, state, repo }
}

async fn next_json(socket: &mut Client) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("Timed out waiting for push")
        .expect("Socket closed unexpectedly")
        .expect("Socket error");
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected text message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let res = reqwest::get(app.url("/health")).await.unwrap();

    assert!(res.status().is_success());
    assert_eq!(res.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = spawn_app().await;
    let res = reqwest::Client::new()
        .get(app.url("/logs"))
        .header("Origin", "http://somewhere.test")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_list_logs_pages_newest_first() {
    let app = spawn_app().await;
    let mut inserted = Vec::new();
    for i in 0..4 {
        inserted.push(app.insert(&format!("log {i}")).await);
    }

    let logs: Vec<Value> = reqwest::get(app.url("/logs?skip=1&limit=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["id"], inserted[2].id.as_str());
    assert_eq!(logs[1]["id"], inserted[1].id.as_str());
    assert_eq!(logs[0]["isFavorite"], false);
    assert_eq!(logs[0]["appName"], "Test");
    assert!(logs[0]["createdAt"].as_str().unwrap().ends_with('Z'));

    let all: Vec<Value> = reqwest::get(app.url("/logs")).await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn test_list_logs_rejects_out_of_range() {
    let app = spawn_app().await;
    for query in ["limit=0", "limit=101", "skip=-1", "limit=abc"] {
        let res = reqwest::get(app.url(&format!("/logs?{query}"))).await.unwrap();
        assert_eq!(res.status(), 400, "{query}");
        let body: Value = res.json().await.unwrap();
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_toggle_favorite() {
    let app = spawn_app().await;
    let record = app.insert("fav me").await;
    let client = reqwest::Client::new();
    let url = app.url(&format!("/logs/{}/favorite", record.id));

    let res = client.patch(&url).json(&json!({"isFavorite": "yes"})).send().await.unwrap();
    assert_eq!(res.status(), 400);

    let res = client.patch(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), 400);

    let res = client.patch(&url).body("not json").send().await.unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .patch(app.url("/logs/missing/favorite"))
        .json(&json!({"isFavorite": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = client.patch(&url).json(&json!({"isFavorite": true})).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"id": record.id, "isFavorite": true}));

    let logs: Vec<Value> = reqwest::get(app.url("/logs")).await.unwrap().json().await.unwrap();
    assert_eq!(logs[0]["isFavorite"], true);
}

#[tokio::test]
async fn test_delete_log() {
    let app = spawn_app().await;
    let record = app.insert("bye").await;
    let client = reqwest::Client::new();

    let res = client.delete(app.url("/logs/missing")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = client.delete(app.url(&format!("/logs/{}", record.id))).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"id": record.id, "deleted": true}));

    let logs: Vec<Value> = reqwest::get(app.url("/logs")).await.unwrap().json().await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = spawn_app().await;
    let a = app.insert("a").await;
    let b = app.insert("b").await;
    let c = app.insert("c").await;
    let client = reqwest::Client::new();
    let url = app.url("/logs/bulk-delete");

    for body in [json!({}), json!({"ids": []}), json!({"ids": "a"})] {
        let res = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(res.status(), 400, "{body}");
    }

    let res = client.post(&url).json(&json!({"ids": ["nope"]})).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let ids = json!([a.id, "ghost", c.id]);
    let res = client.post(&url).json(&json!({ "ids": ids })).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(body["deletedIds"], ids);

    let logs: Vec<Value> = reqwest::get(app.url("/logs")).await.unwrap().json().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["id"], b.id.as_str());
}

#[tokio::test]
async fn test_ws_ingest_broadcasts_to_all_clients() {
    let app = spawn_app().await;
    let mut sender = app.connect_ws().await;
    let mut listener = app.connect_ws().await;

    sender
        .send(Message::Text(r#"{"content":"hello","appName":"App"}"#.into()))
        .await
        .unwrap();

    let pushed_to_listener = next_json(&mut listener).await;
    let pushed_to_sender = next_json(&mut sender).await;
    assert_eq!(pushed_to_listener, pushed_to_sender);
    assert_eq!(pushed_to_listener["content"], "hello");
    assert_eq!(pushed_to_listener["appName"], "App");
    assert_eq!(pushed_to_listener["isFavorite"], false);
    assert!(pushed_to_listener.get("_id").is_none());

    let logs: Vec<Value> = reqwest::get(app.url("/logs")).await.unwrap().json().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0], pushed_to_listener);
}

#[tokio::test]
async fn test_ws_malformed_frame_is_ignored() {
    let app = spawn_app().await;
    let mut a = app.connect_ws().await;
    let mut b = app.connect_ws().await;

    a.send(Message::Text("this is not json".into())).await.unwrap();
    a.send(Message::Text(r#"{"content":"after"}"#.into())).await.unwrap();

    // the first thing either client sees is the valid frame
    assert_eq!(next_json(&mut a).await["content"], "after");
    assert_eq!(next_json(&mut b).await["content"], "after");
    assert_eq!(app.repo.len(), 1);
    assert_eq!(app.state.connections.len(), 2);
}

#[tokio::test]
async fn test_ws_disconnect_unregisters() {
    let app = spawn_app().await;
    let mut socket = app.connect_ws().await;
    socket.close(None).await.unwrap();

    // the server answers the close instead of dropping the TCP stream
    let reply = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("Timed out waiting for close reply");
    match reply {
        Some(Ok(Message::Close(_))) | None => {}
        other => panic!("Expected a close handshake, got {other:?}"),
    }

    for _ in 0..100 {
        if app.state.connections.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(app.state.connections.is_empty());
}
