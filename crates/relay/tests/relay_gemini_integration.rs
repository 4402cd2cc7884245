use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use proto::{LEGACY_RELAY_PATH, RELAY_PATH, RelayRequest};
use relay::{GeminiProvider, PROVIDER_FAILURE, RelayServer};
use serde_json::{Value, json};
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct Upstream {
    status: Arc<Mutex<u16>>,
    seen: Arc<Mutex<Vec<(String, String, Value)>>>,
}

async fn fake_generate(
    State(upstream): State<Upstream>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    upstream
        .seen
        .lock()
        .unwrap()
        .push((model_call, key, body));

    let status = *upstream.status.lock().unwrap();
    let code = StatusCode::from_u16(status).unwrap();
    if code.is_success() {
        (
            code,
            Json(json!({"candidates": [{"content": {"parts": [{"text": "Check the **Fextralife** map."}]}}]})),
        )
    } else {
        (code, Json(json!({"error": {"message": "upstream says no"}})))
    }
}

async fn start_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route("/v1beta/models/{model_call}", post(fake_generate))
        .with_state(upstream);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream serve");
    });
    format!("http://{addr}")
}

async fn start_relay(upstream_url: &str) -> (String, oneshot::Sender<()>) {
    let provider = Arc::new(GeminiProvider::with_base_url(
        "test-key",
        "gemini-2.5-flash",
        upstream_url,
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind relay");
    let port = listener.local_addr().expect("relay addr").port();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        RelayServer::new(port, provider)
            .serve(listener, async {
                let _ = stop_rx.await;
            })
            .await
            .expect("relay serve");
    });
    let base = format!("http://127.0.0.1:{port}");
    wait_for_health(&base).await;
    (base, stop_tx)
}

async fn wait_for_health(base: &str) {
    let url = format!("{base}/health");
    for _ in 0..80 {
        if let Ok(resp) = reqwest::get(&url).await
            && resp.status().is_success()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("relay at {base} did not become healthy in time");
}

#[tokio::test]
async fn relay_forwards_prompt_to_gemini_and_returns_text() {
    let upstream = Upstream::default();
    *upstream.status.lock().unwrap() = 200;
    let upstream_url = start_upstream(upstream.clone()).await;
    let (base, stop) = start_relay(&upstream_url).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}{RELAY_PATH}"))
        .json(&RelayRequest::new("Where is the Dancer?", "Dark Souls III"))
        .send()
        .await
        .expect("relay request");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["response"], "Check the **Fextralife** map.");

    let seen = upstream.seen.lock().unwrap();
    let (model_call, key, payload) = &seen[0];
    assert_eq!(model_call, "gemini-2.5-flash:generateContent");
    assert_eq!(key, "test-key");
    let prompt = payload["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert!(prompt.contains(r#"video game "Dark Souls III""#));
    assert!(prompt.contains(r#"User's question: "Where is the Dancer?""#));

    let _ = stop.send(());
}

#[tokio::test]
async fn upstream_failure_becomes_generic_500_on_both_paths() {
    let upstream = Upstream::default();
    *upstream.status.lock().unwrap() = 503;
    let upstream_url = start_upstream(upstream).await;
    let (base, stop) = start_relay(&upstream_url).await;

    for path in [RELAY_PATH, LEGACY_RELAY_PATH] {
        let resp = reqwest::Client::new()
            .post(format!("{base}{path}"))
            .json(&RelayRequest::new("hi", "Celeste"))
            .send()
            .await
            .expect("relay request");
        assert_eq!(resp.status().as_u16(), 500);
        let body: Value = resp.json().await.expect("json body");
        assert_eq!(body["error"], PROVIDER_FAILURE);
    }

    let _ = stop.send(());
}

#[tokio::test]
async fn upstream_rate_limit_becomes_429() {
    let upstream = Upstream::default();
    *upstream.status.lock().unwrap() = 429;
    let upstream_url = start_upstream(upstream).await;
    let (base, stop) = start_relay(&upstream_url).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}{RELAY_PATH}"))
        .json(&RelayRequest::new("hi", "Celeste"))
        .send()
        .await
        .expect("relay request");
    assert_eq!(resp.status().as_u16(), 429);

    let _ = stop.send(());
}

#[tokio::test]
async fn static_dir_is_served_as_fallback() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<h1>chat</h1>").expect("write index");

    let provider = Arc::new(GeminiProvider::with_base_url("k", "m", "http://127.0.0.1:9"));
    let router = RelayServer::new(0, provider)
        .with_static_dir(dir.path().to_string_lossy().to_string())
        .router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    let base = format!("http://{addr}");
    wait_for_health(&base).await;

    let page = reqwest::get(format!("{base}/index.html"))
        .await
        .expect("get index")
        .text()
        .await
        .expect("body");
    assert_eq!(page, "<h1>chat</h1>");
}
