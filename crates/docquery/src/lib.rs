//! docquery: client for a PDF question-answering backend
//!
//! Uploads one PDF, asks the backend to index it, then forwards questions
//! against it. The [`Workflow`] sequences the three calls, guards the session
//! against overlapping operations and reports each outcome through a
//! [`Notifier`]. A small Spoonacular client covers ingredient-based recipe
//! suggestions.

pub mod config;
pub mod error;
pub mod providers;
pub mod recipes;
pub mod types;
pub mod workflow;

pub use config::{AnswerPolicy, AppConfig};
pub use error::{Error, FailureKind, Result};
pub use providers::{DocumentBackend, HttpBackend};
pub use types::{QueryExchange, Recipe, UploadFile, UploadedDocument};
pub use workflow::{Notification, Notifier, Session, Workflow, WorkflowStatus};
