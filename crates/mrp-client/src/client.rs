//! MrP API client
//!
//! Entry point tying a transport to the resolvers and controllers.
//! Based on the MrP API structure: /api/v1/machine, /api/v1/image, /api/v1/preseed

use crate::common::HttpClient;
use crate::control::image::ImageControl;
use crate::control::preseed::PreseedControl;
use crate::control::resolver::Resolver;
use crate::control::state::StateControl;
use crate::error::MrpError;
use crate::mrp_trait::Transport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, Span};

/// MrP API client
///
/// Cheap to clone. Every controller handed out shares the transport and logs
/// under a child of the span given at construction.
#[derive(Clone)]
pub struct MrpClient {
    transport: Arc<dyn Transport>,
    span: Span,
}

impl MrpClient {
    /// Create a client talking HTTP to `base_url`
    ///
    /// # Arguments
    /// * `base_url` - MrP base URL (e.g., "http://192.168.0.3:5000")
    /// * `token` - API token for authentication
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, MrpError> {
        let span = info_span!("mrp", url = %base_url);
        let http = HttpClient::new(base_url, token, timeout)?;
        Ok(Self::with_transport(Arc::new(http), span))
    }

    /// Create a client over any transport (e.g. `MockMrpServer` in tests)
    pub fn with_transport(transport: Arc<dyn Transport>, span: Span) -> Self {
        Self { transport, span }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Check connectivity and token validity before running operations
    pub async fn validate_token(&self) -> Result<(), MrpError> {
        self.transport.validate_token().await
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(
            Arc::clone(&self.transport),
            info_span!(parent: &self.span, "resolver"),
        )
    }

    pub fn images(&self) -> ImageControl {
        ImageControl::new(
            Arc::clone(&self.transport),
            info_span!(parent: &self.span, "image"),
        )
    }

    pub fn preseeds(&self) -> PreseedControl {
        PreseedControl::new(
            Arc::clone(&self.transport),
            info_span!(parent: &self.span, "preseed"),
        )
    }

    pub fn state(&self) -> StateControl {
        StateControl::new(
            Arc::clone(&self.transport),
            info_span!(parent: &self.span, "state"),
        )
    }
}
