use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use chat::{HttpRelayClient, RelayClient};
use proto::{RelayError, RelayFailure, RelayReply, RelayRequest};
use serde_json::json;

/// Serves `router` on an ephemeral port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client(base: &str) -> HttpRelayClient {
    HttpRelayClient::new(format!("{base}/api/chat"), Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn posts_message_and_context_and_returns_reply() {
    let router = Router::new().route(
        "/api/chat",
        post(|Json(req): Json<RelayRequest>| async move {
            Json(RelayReply::new(format!("[{}] {}", req.context, req.message)))
        }),
    );
    let base = serve(router).await;

    let reply = client(&base)
        .send(&RelayRequest::new("where is the key?", "Hollow Knight"))
        .await
        .expect("reply");
    assert_eq!(reply, "[Hollow Knight] where is the key?");
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelayFailure::new("Failed to get response from AI.")),
            )
        }),
    );
    let base = serve(router).await;

    let err = client(&base)
        .send(&RelayRequest::new("q", "Celeste"))
        .await
        .unwrap_err();
    match err {
        RelayError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to get response from AI.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_body_maps_to_invalid_response() {
    let router = Router::new().route("/api/chat", post(|| async { Json(json!({"text": "hi"})) }));
    let base = serve(router).await;

    let err = client(&base)
        .send(&RelayRequest::new("q", "Celeste"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_relay_maps_to_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let err = client(&format!("http://127.0.0.1:{port}"))
        .send(&RelayRequest::new("q", "Celeste"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
}
