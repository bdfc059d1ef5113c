//! REST API client.
//!
//! One method per endpoint. The client never touches the store; see
//! [`crate::actions`] for the operations that commit responses.

mod files;
mod jobs;
mod messages;
mod users;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::auth;
use crate::config::Config;
use crate::errors::{ClientError, ErrorResponse, Result};
use crate::models::UploadFile;

/// Multipart field name the API reads uploaded files from.
pub const UPLOAD_FIELD: &str = "uploadedFiles[]";

/// Client for the JobTrack REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let headers = auth::default_headers(config.api_token.as_deref(), config.csrf_token.as_deref())?;

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Fail on non-success status, with the server's message when it sent one.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.describe(),
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            Err(_) => format!("Request failed: {}", body),
        };
        Err(ClientError::api(status.as_u16(), message))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ClientError::Json(e)
        })
    }
}

/// Append uploaded files to a multipart form.
fn attach_files(mut form: Form, files: Vec<UploadFile>) -> Result<Form> {
    for file in files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime {
            part = part.mime_str(&mime)?;
        }
        form = form.part(UPLOAD_FIELD, part);
    }
    Ok(form)
}
