//! Session state owned by the workflow

use serde::Serialize;
use uuid::Uuid;

use crate::types::{QueryExchange, UploadedDocument};

/// Progress through upload → index → query readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Idle,
    Uploading,
    Indexing,
    Ready,
    Querying,
    /// Transient: entered on a failed upload or index, then reset to Idle
    Failed,
}

impl WorkflowStatus {
    /// A document is indexed and can be queried (Querying counts as ready)
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready | Self::Querying)
    }

    /// A network operation holds the session
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading | Self::Indexing | Self::Querying)
    }

    /// Name of the operation holding the session, if any
    pub fn busy_with(&self) -> Option<&'static str> {
        match self {
            Self::Uploading => Some("upload"),
            Self::Indexing => Some("indexing"),
            Self::Querying => Some("query"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Indexing => "indexing",
            Self::Ready => "ready",
            Self::Querying => "querying",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-held state for one interactive session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Session ID used in log spans
    pub id: Uuid,
    /// Current workflow status
    pub status: WorkflowStatus,
    /// Active indexed document
    pub document: Option<UploadedDocument>,
    /// Most recent question and answer
    pub last_exchange: Option<QueryExchange>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: WorkflowStatus::Idle,
            document: None,
            last_exchange: None,
        }
    }

    /// Upload in progress (covers the indexing step)
    pub fn is_uploading(&self) -> bool {
        matches!(self.status, WorkflowStatus::Uploading | WorkflowStatus::Indexing)
    }

    /// Query in progress
    pub fn is_querying(&self) -> bool {
        self.status == WorkflowStatus::Querying
    }

    /// Answer currently displayed
    pub fn answer(&self) -> Option<&str> {
        self.last_exchange.as_ref().and_then(|e| e.answer.as_deref())
    }

    /// Locator of the active document
    pub fn locator(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.locator.as_str())
    }
}
