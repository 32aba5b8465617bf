//! Common utilities for the MrP API client
//!
//! Provides the reqwest-backed transport shared by every controller.

pub mod query;

use crate::error::MrpError;
use crate::mrp_trait::Transport;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout applied by [`HttpClient::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A file to be sent as the `file` part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new MrP HTTP client
    ///
    /// # Arguments
    /// * `base_url` - MrP base URL (e.g., "http://192.168.0.3:5000")
    /// * `token` - API token, sent verbatim as the `Authorization` header
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, MrpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MrpError::Http)?;

        Ok(Self::with_client(client, base_url, token))
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Attach auth headers, send, and decode the JSON answer
    async fn send(
        &self,
        method: &'static str,
        url: String,
        request: RequestBuilder,
    ) -> Result<Value, MrpError> {
        let response = request
            .header("Authorization", self.token.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(MrpError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(MrpError::Http)?;

        if !status.is_success() {
            return Err(MrpError::Status {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT && body.trim().is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("{} {} returned a non-JSON body: {}", method, url, e);
                Err(MrpError::InvalidJson { method, url, body })
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate the API token by making a simple authenticated request.
    ///
    /// Uses the machine listing as it is cheap and requires authentication.
    async fn validate_token(&self) -> Result<(), MrpError> {
        debug!("Validating MrP token and connectivity");

        match self.get("/api/v1/machine?show_all=false").await {
            Ok(_) => {
                debug!("Token validated successfully");
                Ok(())
            }
            Err(e) if matches!(e.status(), Some(401 | 403)) => {
                Err(MrpError::Authentication(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, path: &str) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let request = self.client.get(&url);
        self.send("GET", url, request).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("PUT {} with body: {}", url, body);

        let request = self.client.put(&url).json(body);
        self.send("PUT", url, request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);

        let request = self.client.post(&url).json(body);
        self.send("POST", url, request).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        file: FileUpload,
        fields: Vec<(String, String)>,
    ) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!(
            "POST {} multipart: file {} ({} bytes), fields {:?}",
            url,
            file.file_name,
            file.bytes.len(),
            fields
        );

        let mut form = Form::new().part("file", Part::bytes(file.bytes).file_name(file.file_name));
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let request = self.client.post(&url).multipart(form);
        self.send("POST", url, request).await
    }

    async fn delete(&self, path: &str) -> Result<Value, MrpError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let request = self.client.delete(&url);
        self.send("DELETE", url, request).await
    }
}
