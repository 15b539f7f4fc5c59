//! Uploaded document and upload payload types

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// MIME type accepted by the backend
pub const PDF_MIME: &str = "application/pdf";

/// A single file ready to be sent to the upload endpoint
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Filename sent in the multipart part
    pub file_name: String,
    /// Content type of the part
    pub content_type: String,
    /// Raw file bytes
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create an upload payload, guessing the content type from the filename
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Select a PDF from disk
    ///
    /// Rejects anything whose extension does not map to `application/pdf`,
    /// and empty files. The transport itself does not re-check.
    pub async fn select_pdf(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::UnsupportedFileType(path.display().to_string()))?;

        let is_pdf = mime_guess::from_path(path)
            .iter_raw()
            .any(|mime| mime == PDF_MIME);
        if !is_pdf {
            return Err(Error::UnsupportedFileType(format!(
                "{} (only PDF files can be uploaded)",
                file_name
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(Error::UnsupportedFileType(format!("{} is empty", file_name)));
        }

        tracing::debug!("Selected {} ({} bytes)", file_name, bytes.len());
        Ok(Self::new(file_name, bytes))
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A document the backend holds and has indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// Opaque server-assigned locator
    pub locator: String,
    /// Name shown to the user
    pub display_name: String,
}

impl UploadedDocument {
    pub fn new(locator: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            display_name: display_name.into(),
        }
    }

    /// Build from a locator alone, using its last path segment as the name
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let display_name = locator
            .rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or(&locator)
            .to_string();
        Self {
            locator,
            display_name,
        }
    }
}
