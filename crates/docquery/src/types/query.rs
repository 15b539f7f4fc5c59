//! Query exchange and request bodies

use serde::{Deserialize, Serialize};

/// One question and, once answered, its answer
///
/// Only the most recent exchange is kept by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExchange {
    /// Question as submitted (trimmed)
    pub question: String,
    /// Answer text, absent until the backend replies
    pub answer: Option<String>,
}

impl QueryExchange {
    pub fn answered(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: Some(answer.into()),
        }
    }
}

/// Body of `POST /query`
///
/// The backend reads `query_text`; older front ends sent `query`, which it ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_text: String,
}

impl QueryRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
        }
    }
}

/// Body of `POST /populate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulateRequest {
    pub file_path: String,
}
