//! Integration tests for follow-up chat against an in-process HTTP server.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use quiz_client::{
    ApiClient, ChatMessage, Product, Question, QuizAnswer, QuizContext, Sender,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

struct Canned {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<Value>>,
}

async fn respond(State(canned): State<Arc<Canned>>, body: Bytes) -> (StatusCode, String) {
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    canned.requests.lock().unwrap().push(value);
    (canned.status, canned.body.clone())
}

/// Serve `POST /chat` with a fixed reply. Returns the base URL and the canned state.
async fn spawn_chat_server(status: StatusCode, body: &str) -> (String, Arc<Canned>) {
    let canned = Arc::new(Canned {
        status,
        body: body.to_string(),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/chat", post(respond))
        .with_state(Arc::clone(&canned));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), canned)
}

fn quiz_context() -> QuizContext {
    QuizContext {
        answers: vec![QuizAnswer {
            question: Question::new("q1", "jackets", "What weather?"),
            product: Some(Product::new("1", "Rain Shell")),
        }],
        summary: "Wet climate, light packer".into(),
        chat_messages: vec![ChatMessage {
            id: "m1".into(),
            sender: Sender::Gpt,
            text: "The Rain Shell is a good fit.".into(),
            timestamp: 1_700_000_000_000,
        }],
    }
}

#[tokio::test]
async fn returns_reply_verbatim() {
    let (url, _canned) = spawn_chat_server(StatusCode::OK, r#"{"reply":"Try size M"}"#).await;

    let reply = ApiClient::new(url)
        .ask("What about size?", &[], &QuizContext::default())
        .await
        .expect("chat should succeed");
    assert_eq!(reply, "Try size M");
}

#[tokio::test]
async fn sends_message_and_context_envelope_untouched() {
    let (url, canned) = spawn_chat_server(StatusCode::OK, r#"{"reply":"ok"}"#).await;
    let products = vec![Product::new("1", "Rain Shell"), Product::new("2", "Down Parka")];
    let context = quiz_context();

    ApiClient::new(url)
        .ask("Which is warmer?", &products, &context)
        .await
        .unwrap();

    let requests = canned.requests.lock().unwrap();
    assert_eq!(
        requests[0],
        json!({
            "message": "Which is warmer?",
            "context": {
                "products": [
                    {"id": "1", "title": "Rain Shell"},
                    {"id": "2", "title": "Down Parka"}
                ],
                "answers": [{
                    "question": {"id": "q1", "category": "jackets", "text": "What weather?"},
                    "product": {"id": "1", "title": "Rain Shell"}
                }],
                "summary": "Wet climate, light packer",
                "chatMessages": [{
                    "id": "m1",
                    "sender": "gpt",
                    "text": "The Rain Shell is a good fit.",
                    "timestamp": 1_700_000_000_000i64
                }]
            }
        })
    );
}

#[tokio::test]
async fn server_error_with_unparseable_body() {
    let (url, _canned) =
        spawn_chat_server(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>").await;

    let err = ApiClient::new(url)
        .ask("What about size?", &[], &QuizContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, 500);
    assert_eq!(err.message, "API request failed with status 500");
}

#[tokio::test]
async fn server_error_with_json_body() {
    let (url, _canned) = spawn_chat_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"model overloaded"}"#,
    )
    .await;

    let err = ApiClient::new(url)
        .ask("What about size?", &[], &QuizContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, 500);
    assert_eq!(err.message, "API request failed with status 500");
}

#[tokio::test]
async fn status_errors_propagate_their_status() {
    let (url, _canned) = spawn_chat_server(StatusCode::TOO_MANY_REQUESTS, "").await;

    let err = ApiClient::new(url)
        .ask("hello", &[], &QuizContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, 429);
}

#[tokio::test]
async fn malformed_success_body_is_wrapped() {
    let (url, _canned) = spawn_chat_server(StatusCode::OK, r#"{"answer":"wrong field"}"#).await;

    let err = ApiClient::new(url)
        .ask("hello", &[], &QuizContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, 500);
    assert_eq!(err.message, "failed to get chat response");
}

#[tokio::test]
async fn unreachable_server_is_wrapped() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = ApiClient::new(format!("http://127.0.0.1:{}", port))
        .ask("hello", &[], &QuizContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, 500);
    assert_eq!(err.message, "failed to get chat response");
}
