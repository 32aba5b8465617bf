//! Transport trait for mocking
//!
//! This trait abstracts the HTTP layer underneath the resolvers and controllers.
//! The concrete `HttpClient` implements it, and tests use `MockMrpServer`.

use crate::common::FileUpload;
use crate::error::MrpError;
use serde_json::Value;

/// Authenticated JSON transport to an MrP server
///
/// Paths are absolute API paths (`/api/v1/...`) including any query string.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Check that the server is reachable and accepts the token
    async fn validate_token(&self) -> Result<(), MrpError>;

    async fn get(&self, path: &str) -> Result<Value, MrpError>;
    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError>;

    /// POST a multipart form made of one file part named `file` and plain text fields
    async fn post_multipart(
        &self,
        path: &str,
        file: FileUpload,
        fields: Vec<(String, String)>,
    ) -> Result<Value, MrpError>;

    async fn delete(&self, path: &str) -> Result<Value, MrpError>;
}
