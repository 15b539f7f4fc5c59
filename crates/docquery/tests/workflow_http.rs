//! Upload, index and query through the workflow over HTTP

mod common;

use axum::http::StatusCode;
use common::{spawn, MockBackend, Reply};
use docquery::config::WorkflowConfig;
use docquery::workflow::{ChannelNotifier, WorkflowEvent};
use docquery::{Error, FailureKind, HttpBackend, Notification, UploadFile, Workflow, WorkflowStatus};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

async fn workflow_for(
    mock: &Arc<MockBackend>,
) -> (Workflow, UnboundedReceiver<WorkflowEvent>) {
    let url = spawn(mock.clone()).await;
    let backend = Arc::new(HttpBackend::with_client(Client::new(), &url));
    let (notifier, events) = ChannelNotifier::new();
    let workflow = Workflow::new(backend, Arc::new(notifier), WorkflowConfig::default());
    (workflow, events)
}

fn drain(events: &mut UnboundedReceiver<WorkflowEvent>) -> Vec<WorkflowEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn notifications(events: &[WorkflowEvent]) -> Vec<Notification> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::Notification(n) => Some(n.clone()),
            WorkflowEvent::Status { .. } => None,
        })
        .collect()
}

fn transitions(events: &[WorkflowEvent]) -> Vec<(WorkflowStatus, WorkflowStatus)> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::Status { from, to } => Some((*from, *to)),
            WorkflowEvent::Notification(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_upload_then_query() {
    let mock = MockBackend::new();
    let (workflow, mut events) = workflow_for(&mock).await;

    let document = workflow
        .upload(UploadFile::new("notes.pdf", b"%PDF-1.4".to_vec()))
        .await
        .unwrap();
    assert_eq!(document.locator, "/tmp/notes.pdf");
    assert_eq!(document.display_name, "notes.pdf");
    assert_eq!(workflow.status(), WorkflowStatus::Ready);

    let answer = workflow.ask("What is this about?").await.unwrap();
    assert_eq!(answer, "It is a summary.");

    let session = workflow.session();
    assert_eq!(session.answer(), Some("It is a summary."));
    assert_eq!(session.locator(), Some("/tmp/notes.pdf"));

    assert_eq!(
        mock.populate_bodies.lock().clone(),
        vec![json!({ "file_path": "/tmp/notes.pdf" })]
    );
    assert_eq!(
        mock.query_bodies.lock().clone(),
        vec![json!({ "query_text": "What is this about?" })]
    );

    let events = drain(&mut events);
    assert_eq!(
        transitions(&events),
        vec![
            (WorkflowStatus::Idle, WorkflowStatus::Uploading),
            (WorkflowStatus::Uploading, WorkflowStatus::Indexing),
            (WorkflowStatus::Indexing, WorkflowStatus::Ready),
            (WorkflowStatus::Ready, WorkflowStatus::Querying),
            (WorkflowStatus::Querying, WorkflowStatus::Ready),
        ]
    );
    let notes = notifications(&events);
    assert_eq!(notes.len(), 1);
    assert!(!notes[0].is_error());
}

#[tokio::test]
async fn test_upload_failure_skips_indexing() {
    let mock = MockBackend::new();
    *mock.upload.lock() = Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "disk full" }),
    );
    let (workflow, mut events) = workflow_for(&mock).await;

    let err = workflow
        .upload(UploadFile::new("notes.pdf", vec![1u8]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(_)));
    assert_eq!(MockBackend::calls(&mock.upload_calls), 1);
    assert_eq!(MockBackend::calls(&mock.populate_calls), 0);
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
    assert!(workflow.session().document.is_none());

    let events = drain(&mut events);
    assert_eq!(
        transitions(&events),
        vec![
            (WorkflowStatus::Idle, WorkflowStatus::Uploading),
            (WorkflowStatus::Uploading, WorkflowStatus::Failed),
            (WorkflowStatus::Failed, WorkflowStatus::Idle),
        ]
    );
    let notes = notifications(&events);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind(), Some(FailureKind::Upload));
}

#[tokio::test]
async fn test_indexing_failure_leaves_nothing_to_query() {
    let mock = MockBackend::new();
    *mock.populate.lock() = Reply::status(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let (workflow, mut events) = workflow_for(&mock).await;

    let err = workflow
        .upload(UploadFile::new("notes.pdf", vec![1u8]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Indexing(_)));
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
    drain(&mut events);

    let err = workflow.ask("Anything?").await.unwrap_err();
    assert!(matches!(err, Error::NoDocument));
    assert_eq!(MockBackend::calls(&mock.query_calls), 0);

    let notes = notifications(&drain(&mut events));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message(), "Please upload a PDF first");
}

#[tokio::test]
async fn test_failed_query_keeps_previous_answer() {
    let mock = MockBackend::new();
    let (workflow, _events) = workflow_for(&mock).await;

    workflow
        .upload(UploadFile::new("notes.pdf", vec![1u8]))
        .await
        .unwrap();
    workflow.ask("First?").await.unwrap();

    *mock.query.lock() = Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "llm timeout" }),
    );
    let err = workflow.ask("Second?").await.unwrap_err();

    assert!(matches!(err, Error::Query(ref m) if m.contains("llm timeout")));
    assert_eq!(workflow.status(), WorkflowStatus::Ready);
    assert_eq!(workflow.session().answer(), Some("It is a summary."));
}

#[tokio::test]
async fn test_restore_adopts_first_listed_file() {
    let mock = MockBackend::new();
    *mock.check.lock() = Reply::ok(json!({ "files": ["uploads/report.pdf", "uploads/old.pdf"] }));
    let (workflow, _events) = workflow_for(&mock).await;

    let document = workflow.restore().await.unwrap().unwrap();
    assert_eq!(document.locator, "uploads/report.pdf");
    assert_eq!(document.display_name, "report.pdf");
    assert_eq!(workflow.status(), WorkflowStatus::Ready);

    workflow.ask("Summary?").await.unwrap();
    assert_eq!(MockBackend::calls(&mock.upload_calls), 0);
}

#[tokio::test]
async fn test_restore_with_empty_backend() {
    let mock = MockBackend::new();
    let (workflow, mut events) = workflow_for(&mock).await;

    assert!(workflow.restore().await.unwrap().is_none());
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_reset_clears_session() {
    let mock = MockBackend::new();
    let (workflow, _events) = workflow_for(&mock).await;

    workflow
        .upload(UploadFile::new("notes.pdf", vec![1u8]))
        .await
        .unwrap();
    workflow.reset().await.unwrap();

    assert_eq!(MockBackend::calls(&mock.reset_calls), 1);
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
    assert!(workflow.session().document.is_none());
}

#[tokio::test]
async fn test_failed_reset_keeps_document() {
    let mock = MockBackend::new();
    *mock.reset.lock() = Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "chroma locked" }),
    );
    let (workflow, mut events) = workflow_for(&mock).await;

    workflow
        .upload(UploadFile::new("notes.pdf", vec![1u8]))
        .await
        .unwrap();
    workflow.ask("What is this about?").await.unwrap();
    drain(&mut events);

    let err = workflow.reset().await.unwrap_err();
    assert!(matches!(err, Error::Backend(ref m) if m.contains("chroma locked")));

    let session = workflow.session();
    assert_eq!(session.status, WorkflowStatus::Ready);
    assert_eq!(session.locator(), Some("/tmp/notes.pdf"));
    assert_eq!(session.answer(), Some("It is a summary."));

    let events = drain(&mut events);
    assert!(transitions(&events).is_empty());
    let notes = notifications(&events);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind(), Some(FailureKind::Backend));
}
