//! Upload → index → query workflow
//!
//! [`Workflow`] owns the session and is the only writer of its state. Each
//! operation checks and claims the session under a short lock, releases it for
//! the network call, and settles the outcome under the lock again, so tasks
//! sharing an `Arc<Workflow>` can never interleave two uploads or two queries.
//!
//! ```text
//! Idle ──upload──▶ Uploading ──ok──▶ Indexing ──ok──▶ Ready ◀──▶ Querying
//!                      │                 │
//!                      └──fail──▶ Failed ◀┘──▶ Idle, or Ready if the
//!                                              previous document survives
//! ```

pub mod notify;
pub mod session;

use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::{AnswerPolicy, WorkflowConfig};
use crate::error::{Error, Result};
use crate::providers::DocumentBackend;
use crate::types::{QueryExchange, UploadFile, UploadedDocument};

pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier, WorkflowEvent};
pub use session::{Session, WorkflowStatus};

/// Workflow orchestrator for one session
pub struct Workflow {
    backend: Arc<dyn DocumentBackend>,
    notifier: Arc<dyn Notifier>,
    config: WorkflowConfig,
    session: Mutex<Session>,
}

/// Outcome of claiming the session for a query
enum QueryClaim {
    Claimed,
    Busy,
    NotReady,
}

impl Workflow {
    /// Create a workflow with an empty session
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        notifier: Arc<dyn Notifier>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            config,
            session: Mutex::new(Session::new()),
        }
    }

    /// Snapshot of the session
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    /// Current status
    pub fn status(&self) -> WorkflowStatus {
        self.session.lock().status
    }

    /// Backend in use
    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    /// Policy configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Upload a file and index it
    ///
    /// Rejected with `Error::Busy` while another upload or a query is in
    /// flight. Indexing is only attempted after the upload returns a locator.
    /// The previous document and its answer are retired once the backend
    /// accepts the new file. A failed upload passes through `Failed` back to
    /// the session as it was; a failed index passes through `Failed` to
    /// `Idle` with no active document.
    pub async fn upload(&self, file: UploadFile) -> Result<UploadedDocument> {
        let (session_id, from) = {
            let mut session = self.session.lock();
            if let Some(op) = session.status.busy_with() {
                tracing::debug!("Upload of {} rejected: {} in progress", file.file_name, op);
                return Err(Error::Busy(op));
            }
            let from = session.status;
            session.status = WorkflowStatus::Uploading;
            (session.id, from)
        };
        self.notifier.status_changed(from, WorkflowStatus::Uploading);
        tracing::info!(session = %session_id, "Uploading {}", file.file_name);

        let locator = match self.backend.upload(&file).await {
            Ok(locator) => locator,
            Err(err) => return Err(self.abort_upload(into_stage(err, Error::Upload))),
        };

        // The backend discards its previous upload and index once it stores a new one
        {
            let mut session = self.session.lock();
            if let Some(previous) = session.document.take() {
                tracing::info!("Retiring {}", previous.display_name);
            }
            session.last_exchange = None;
            session.status = WorkflowStatus::Indexing;
        }
        self.notifier
            .status_changed(WorkflowStatus::Uploading, WorkflowStatus::Indexing);

        if let Err(err) = self.backend.populate(&locator).await {
            tracing::warn!("{} stored at {} but not indexed", file.file_name, locator);
            return Err(self.abort_upload(into_stage(err, Error::Indexing)));
        }

        let document = UploadedDocument::new(locator, file.file_name);
        {
            let mut session = self.session.lock();
            session.document = Some(document.clone());
            session.status = WorkflowStatus::Ready;
        }
        self.notifier
            .status_changed(WorkflowStatus::Indexing, WorkflowStatus::Ready);
        self.notifier.notify(Notification::success(format!(
            "{} uploaded and ready for questions",
            document.display_name
        )));
        tracing::info!(session = %session_id, "Document ready: {}", document.locator);

        Ok(document)
    }

    /// Ask a question about the active document
    ///
    /// An empty question is rejected before anything else. A question while
    /// no document is ready fails with `Error::NoDocument` without touching
    /// the network; one while another query is outstanding fails with
    /// `Error::Busy`. On a failed query the session returns to `Ready` and the
    /// previous answer is kept or cleared per `on_query_failure`.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            tracing::debug!("Ignoring empty question");
            return Err(Error::EmptyQuestion);
        }

        let claim = {
            let mut session = self.session.lock();
            match session.status {
                WorkflowStatus::Querying => QueryClaim::Busy,
                WorkflowStatus::Ready => {
                    session.status = WorkflowStatus::Querying;
                    QueryClaim::Claimed
                }
                _ => QueryClaim::NotReady,
            }
        };

        match claim {
            QueryClaim::Claimed => {}
            QueryClaim::Busy => {
                tracing::debug!("Question ignored: query already in progress");
                return Err(Error::Busy("query"));
            }
            QueryClaim::NotReady => {
                let err = Error::NoDocument;
                self.notifier.notify(Notification::from_error(&err));
                return Err(err);
            }
        }
        self.notifier
            .status_changed(WorkflowStatus::Ready, WorkflowStatus::Querying);

        match self.backend.query(question).await {
            Ok(answer) => {
                {
                    let mut session = self.session.lock();
                    session.last_exchange = Some(QueryExchange::answered(question, answer.clone()));
                    session.status = WorkflowStatus::Ready;
                }
                self.notifier
                    .status_changed(WorkflowStatus::Querying, WorkflowStatus::Ready);
                Ok(answer)
            }
            Err(err) => {
                let err = into_stage(err, Error::Query);
                {
                    let mut session = self.session.lock();
                    if self.config.on_query_failure == AnswerPolicy::Clear {
                        session.last_exchange = None;
                    }
                    session.status = WorkflowStatus::Ready;
                }
                self.notifier
                    .status_changed(WorkflowStatus::Querying, WorkflowStatus::Ready);
                self.notifier.notify(Notification::from_error(&err));
                Err(err)
            }
        }
    }

    /// Adopt a document the backend already holds
    ///
    /// Best effort: if the backend lists any files the first becomes the
    /// active document and the session goes straight to `Ready`. Nothing is
    /// adopted while an operation is in flight. A failed lookup leaves the
    /// session untouched and is returned without a notification.
    pub async fn restore(&self) -> Result<Option<UploadedDocument>> {
        if self.status().is_busy() {
            return Ok(None);
        }

        let files = self.backend.check_uploads().await.map_err(|err| {
            tracing::warn!("Startup lookup failed: {}", err);
            err
        })?;

        let Some(first) = files.into_iter().next() else {
            tracing::debug!("Backend holds no previous uploads");
            return Ok(None);
        };

        let document = UploadedDocument::from_locator(first);
        let from = {
            let mut session = self.session.lock();
            if session.status.is_busy() {
                return Ok(None);
            }
            let from = session.status;
            session.document = Some(document.clone());
            session.status = WorkflowStatus::Ready;
            from
        };
        if from != WorkflowStatus::Ready {
            self.notifier.status_changed(from, WorkflowStatus::Ready);
        }
        self.notifier.notify(Notification::success(format!(
            "Using previously uploaded {}",
            document.display_name
        )));

        Ok(Some(document))
    }

    /// Clear the backend index and start over
    pub async fn reset(&self) -> Result<()> {
        if let Some(op) = self.status().busy_with() {
            return Err(Error::Busy(op));
        }

        if let Err(err) = self.backend.reset().await {
            self.notifier.notify(Notification::from_error(&err));
            return Err(err);
        }

        let from = {
            let mut session = self.session.lock();
            if session.status.is_busy() {
                // an upload claimed the session while the reset was in flight
                tracing::warn!("Backend reset while {} was starting", session.status);
                return Ok(());
            }
            let from = session.status;
            session.document = None;
            session.last_exchange = None;
            session.status = WorkflowStatus::Idle;
            from
        };
        if from != WorkflowStatus::Idle {
            self.notifier.status_changed(from, WorkflowStatus::Idle);
        }
        self.notifier.notify(Notification::success("Backend index cleared"));

        Ok(())
    }

    /// Settle a failed upload or index: `Failed`, then straight back to
    /// `Ready` if a document is still active, else `Idle`
    fn abort_upload(&self, err: Error) -> Error {
        let (from, to) = {
            let mut session = self.session.lock();
            let from = session.status;
            let to = if session.document.is_some() {
                WorkflowStatus::Ready
            } else {
                WorkflowStatus::Idle
            };
            session.status = to;
            (from, to)
        };
        self.notifier.status_changed(from, WorkflowStatus::Failed);
        self.notifier.notify(Notification::from_error(&err));
        self.notifier.status_changed(WorkflowStatus::Failed, to);
        err
    }
}

/// Keep stage errors as they are, fold anything else into the stage's variant
fn into_stage(err: Error, stage: fn(String) -> Error) -> Error {
    match err {
        Error::Upload(_) | Error::Indexing(_) | Error::Query(_) => err,
        other => stage(other.to_string()),
    }
}
