use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct UploadedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    body: String,
}

async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn backend_for(url: &str, timeout: Duration) -> HttpBackend {
    HttpBackend::new(&ClientSettings {
        backend_url: url.to_string(),
        request_timeout: timeout,
    })
    .expect("backend")
}

async fn handle_chat(
    State(seen): State<Arc<Mutex<Vec<Value>>>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.lock().await.push(body);
    Json(json!({ "status": "success", "answer": "4" }))
}

async fn handle_upload(
    State(seen): State<Arc<Mutex<Vec<UploadedField>>>>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.expect("field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.text().await.expect("field text");
        seen.lock().await.push(UploadedField {
            name,
            file_name,
            content_type,
            body,
        });
    }
    Json(json!({ "status": "success", "answer": "120" }))
}

#[tokio::test]
async fn chat_posts_json_query_and_reads_answer() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/chat", post(handle_chat))
        .with_state(seen.clone());
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let answer = backend
        .dispatch(DispatchRequest::Chat {
            query: "What is 2+2?".into(),
        })
        .await
        .expect("dispatch");

    assert_eq!(answer, "4");
    assert_eq!(*seen.lock().await, vec![json!({ "query": "What is 2+2?" })]);
}

#[tokio::test]
async fn document_questions_are_sent_as_multipart() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/upload", post(handle_upload))
        .with_state(seen.clone());
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let answer = backend
        .dispatch(DispatchRequest::DocumentQa {
            document: DocumentUpload::new("data.csv", b"id,total\n1,120\n".to_vec()),
            query: "total rows?".into(),
        })
        .await
        .expect("dispatch");
    assert_eq!(answer, "120");

    let fields = seen.lock().await.clone();
    assert_eq!(fields.len(), 2);
    let file = fields.iter().find(|f| f.name == "file").expect("file field");
    assert_eq!(file.file_name.as_deref(), Some("data.csv"));
    assert_eq!(file.content_type.as_deref(), Some("text/csv"));
    assert_eq!(file.body, "id,total\n1,120\n");
    let query = fields.iter().find(|f| f.name == "query").expect("query field");
    assert_eq!(query.body, "total rows?");
    assert!(query.file_name.is_none());
}

#[tokio::test]
async fn grammar_and_translation_read_their_own_fields() {
    let app = Router::new()
        .route(
            "/grammar",
            post(|| async { Json(json!({ "status": "success", "corrected_text": "He goes home" })) }),
        )
        .route(
            "/translate",
            post(|| async { Json(json!({ "status": "success", "translated_text": "Good morning" })) }),
        );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let corrected = backend
        .dispatch(DispatchRequest::GrammarCheck {
            query: "He go home".into(),
        })
        .await
        .expect("grammar");
    let translated = backend
        .dispatch(DispatchRequest::Translation {
            query: "Selamat pagi".into(),
        })
        .await
        .expect("translate");

    assert_eq!(corrected, "He goes home");
    assert_eq!(translated, "Good morning");
}

#[tokio::test]
async fn error_status_carries_backend_message() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "overloaded" })),
            )
        }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let err = backend
        .dispatch(DispatchRequest::Chat { query: "hi".into() })
        .await
        .expect_err("should fail");

    assert_eq!(err.kind, DispatchErrorKind::HttpStatus);
    assert_eq!(err.status, Some(500));
    assert_eq!(err.mode, InteractionMode::Chat);
    assert!(err.message.contains("overloaded"));
}

#[tokio::test]
async fn plain_text_error_bodies_are_surfaced() {
    let app = Router::new().route(
        "/translate",
        post(|| async { (StatusCode::BAD_REQUEST, "Query is required\n") }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let err = backend
        .dispatch(DispatchRequest::Translation { query: "x".into() })
        .await
        .expect_err("should fail");

    assert_eq!(err.status, Some(400));
    assert_eq!(err.message, "Query is required");
}

#[tokio::test]
async fn empty_error_body_gets_generic_message() {
    let app = Router::new().route(
        "/grammar",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let err = backend
        .dispatch(DispatchRequest::GrammarCheck { query: "x".into() })
        .await
        .expect_err("should fail");

    assert_eq!(err.kind, DispatchErrorKind::HttpStatus);
    assert_eq!(err.message, "backend returned HTTP 503");
}

#[tokio::test]
async fn success_without_expected_field_is_malformed() {
    let app = Router::new().route(
        "/translate",
        post(|| async { Json(json!({ "status": "success", "answer": "Good morning" })) }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_secs(5));

    let err = backend
        .dispatch(DispatchRequest::Translation {
            query: "Selamat pagi".into(),
        })
        .await
        .expect_err("should fail");

    assert_eq!(err.kind, DispatchErrorKind::MalformedResponse);
    assert!(err.message.contains("translated_text"));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "answer": "late" }))
        }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&url, Duration::from_millis(200));

    let err = backend
        .dispatch(DispatchRequest::Chat { query: "hi".into() })
        .await
        .expect_err("should time out");

    assert_eq!(err.kind, DispatchErrorKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = backend_for(&format!("http://{addr}"), Duration::from_secs(5));

    let err = backend
        .dispatch(DispatchRequest::Chat { query: "hi".into() })
        .await
        .expect_err("should fail");

    assert_eq!(err.kind, DispatchErrorKind::Transport);
    assert!(err.status.is_none());
}

#[tokio::test]
async fn endpoints_join_under_a_base_path() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({ "answer": "prefixed" })) }),
    );
    let url = spawn_backend(app).await;
    let backend = backend_for(&format!("{url}/api"), Duration::from_secs(5));

    let answer = backend
        .dispatch(DispatchRequest::Chat { query: "hi".into() })
        .await
        .expect("dispatch");
    assert_eq!(answer, "prefixed");
}

#[test]
fn zero_timeout_is_rejected() {
    let err = HttpBackend::new(&ClientSettings {
        backend_url: "http://localhost:8080".into(),
        request_timeout: Duration::ZERO,
    })
    .err()
    .expect("zero timeout");
    assert!(matches!(err, ConfigError::ZeroTimeout));
}
