//! In-process stand-in for the document backend

#![allow(dead_code)]

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Canned reply for one endpoint
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

/// One multipart part as the server saw it
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

pub struct MockBackend {
    pub upload: Mutex<Reply>,
    pub populate: Mutex<Reply>,
    pub query: Mutex<Reply>,
    pub check: Mutex<Reply>,
    pub reset: Mutex<Reply>,
    pub parts: Mutex<Vec<ReceivedPart>>,
    pub populate_bodies: Mutex<Vec<Value>>,
    pub query_bodies: Mutex<Vec<Value>>,
    pub upload_calls: AtomicUsize,
    pub populate_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
}

impl MockBackend {
    /// Backend that accepts everything and knows no previous uploads
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            upload: Mutex::new(Reply::ok(json!({
                "message": "File uploaded and processed successfully",
                "file_path": "/tmp/notes.pdf"
            }))),
            populate: Mutex::new(Reply::ok(json!({ "message": "Database populated" }))),
            query: Mutex::new(Reply::ok(json!({ "response": "It is a summary." }))),
            check: Mutex::new(Reply::status(
                StatusCode::NOT_FOUND,
                json!({ "message": "No PDFs found" }),
            )),
            reset: Mutex::new(Reply::ok(json!({
                "message": "Chroma database cleared successfully!"
            }))),
            parts: Mutex::new(Vec::new()),
            populate_bodies: Mutex::new(Vec::new()),
            query_bodies: Mutex::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
            populate_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

type Shared = Arc<MockBackend>;

fn respond(reply: &Mutex<Reply>) -> (StatusCode, Json<Value>) {
    let reply = reply.lock().clone();
    (reply.status, Json(reply.body))
}

async fn upload(State(mock): State<Shared>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    mock.upload_calls.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        mock.parts.lock().push(ReceivedPart {
            name,
            file_name,
            content_type,
            len,
        });
    }
    respond(&mock.upload)
}

async fn populate(State(mock): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    mock.populate_calls.fetch_add(1, Ordering::SeqCst);
    mock.populate_bodies.lock().push(body);
    respond(&mock.populate)
}

async fn query(State(mock): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    mock.query_calls.fetch_add(1, Ordering::SeqCst);
    mock.query_bodies.lock().push(body);
    respond(&mock.query)
}

async fn check_uploads(State(mock): State<Shared>) -> (StatusCode, Json<Value>) {
    respond(&mock.check)
}

async fn reset(State(mock): State<Shared>) -> (StatusCode, Json<Value>) {
    mock.reset_calls.fetch_add(1, Ordering::SeqCst);
    respond(&mock.reset)
}

async fn home() -> &'static str {
    "Flask App is Running!"
}

/// Serve the mock on an ephemeral port and return its base URL
pub async fn spawn(mock: Shared) -> String {
    let app = Router::new()
        .route("/", get(home))
        .route("/upload", post(upload))
        .route("/populate", post(populate))
        .route("/query", post(query))
        .route("/check-uploads", get(check_uploads))
        .route("/reset_chroma", post(reset))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
