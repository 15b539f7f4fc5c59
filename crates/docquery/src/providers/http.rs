//! HTTP client for the document backend

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::types::response::ErrorBody;
use crate::types::{
    CheckUploadsResponse, PopulateRequest, QueryRequest, QueryResponse, UploadFile, UploadResponse,
};

use super::backend::DocumentBackend;

/// Backend endpoint paths
pub mod endpoints {
    pub const UPLOAD: &str = "/upload";
    pub const POPULATE: &str = "/populate";
    pub const QUERY: &str = "/query";
    pub const CHECK_UPLOADS: &str = "/check-uploads";
    pub const RESET: &str = "/reset_chroma";
    pub const HEALTH: &str = "/";
}

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Document backend over HTTP
pub struct HttpBackend {
    /// HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl HttpBackend {
    /// Create a client from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(2);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create from an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Describe a non-2xx response, including the backend's `error` field if present
async fn failure_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match ErrorBody::detail(&body) {
        Some(detail) => format!("HTTP {} - {}", status, detail),
        None => format!("HTTP {}", status),
    }
}

#[async_trait]
impl DocumentBackend for HttpBackend {
    async fn upload(&self, file: &UploadFile) -> Result<String> {
        let url = self.url(endpoints::UPLOAD);
        tracing::info!("Uploading {} ({} bytes)", file.file_name, file.len());

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| Error::upload(format!("Invalid content type: {}", e)))?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::upload(failure_detail(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(format!("Failed to parse upload response: {}", e)))?;

        let locator = body
            .locator()
            .ok_or_else(|| Error::upload("Response did not include a file_path"))?;

        tracing::debug!("Backend stored {} at {}", file.file_name, locator);
        Ok(locator.to_string())
    }

    async fn populate(&self, locator: &str) -> Result<()> {
        let url = self.url(endpoints::POPULATE);
        let request = PopulateRequest {
            file_path: locator.to_string(),
        };

        tracing::info!("Indexing {}", locator);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::indexing(format!("Populate request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::indexing(failure_detail(response).await));
        }

        Ok(())
    }

    async fn query(&self, question: &str) -> Result<String> {
        let url = self.url(endpoints::QUERY);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest::new(question))
            .send()
            .await
            .map_err(|e| Error::query(format!("Query request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::query(failure_detail(response).await));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::query(format!("Failed to parse query response: {}", e)))?;

        Ok(body.response)
    }

    async fn check_uploads(&self) -> Result<Vec<String>> {
        let url = self.url(endpoints::CHECK_UPLOADS);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::backend(format!("Upload lookup failed: {}", e)))?;

        // The backend answers 404 when its upload folder holds no PDFs
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Error::backend(failure_detail(response).await));
        }

        let body: CheckUploadsResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Failed to parse upload list: {}", e)))?;

        Ok(body.files)
    }

    async fn reset(&self) -> Result<()> {
        let url = self.url(endpoints::RESET);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::backend(format!("Reset request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::backend(failure_detail(response).await));
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let url = self.url(endpoints::HEALTH);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
