//! Preseed / kickstart upload
//!
//! Create (POST) when the name is unknown, update (PUT + id) when it exists.

use super::resolver::Resolver;
use crate::common::query::{decode, preseed_path, PRESEED_PATH};
use crate::error::MrpError;
use crate::models::{Preseed, PreseedPayload, PreseedType};
use crate::mrp_trait::Transport;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, Span};

/// Get-or-create/update controller for installer answer files
#[derive(Clone)]
pub struct PreseedControl {
    transport: Arc<dyn Transport>,
    resolver: Resolver,
    span: Span,
}

impl PreseedControl {
    pub fn new(transport: Arc<dyn Transport>, span: Span) -> Self {
        let resolver = Resolver::new(Arc::clone(&transport), span.clone());
        Self {
            transport,
            resolver,
            span,
        }
    }

    /// Look up a preseed by name; `Ok(None)` if it does not exist
    pub async fn find_preseed(
        &self,
        name: &str,
        type_filter: Option<PreseedType>,
    ) -> Result<Option<Preseed>, MrpError> {
        self.resolver.resolve_preseed(name, type_filter).await
    }

    /// Id of a preseed that must exist
    pub async fn get_preseed_id(&self, name: &str) -> Result<u64, MrpError> {
        self.resolver
            .resolve_preseed_id(name, None)
            .await?
            .ok_or_else(|| MrpError::UnknownPreseed(name.to_string()))
    }

    /// Fetch a preseed by id, content included
    #[instrument(parent = &self.span, skip(self))]
    pub async fn get_preseed(&self, preseed_id: u64) -> Result<Preseed, MrpError> {
        let value = self.transport.get(&preseed_path(preseed_id)).await?;
        decode(value)
    }

    /// Make sure a preseed named `name` exists, uploading `path` when given
    ///
    /// Without a file the existing record is returned unchanged. With a file
    /// the record is created, or replaced if the name is already taken.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn ensure_preseed(
        &self,
        name: &str,
        path: Option<&Path>,
        preseed_type: PreseedType,
        description: Option<&str>,
        public: bool,
        known_good: bool,
    ) -> Result<Preseed, MrpError> {
        let existing = self.find_preseed(name, None).await?;

        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            return match existing {
                Some(existing) => {
                    debug!("Preseed '{}' exists (ID: {}), nothing to upload", name, existing.id);
                    Ok(existing)
                }
                None => Err(MrpError::InvalidArgument(format!(
                    "preseed '{}' does not exist and no file was given",
                    name
                ))),
            };
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| MrpError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if content.is_empty() {
            return Err(MrpError::InvalidArgument(format!(
                "preseed file {} is empty",
                path.display()
            )));
        }

        let payload = PreseedPayload {
            name: name.to_string(),
            preseed_type,
            public,
            known_good,
            content,
            description: description
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        let body = serde_json::to_value(&payload)?;

        let response = match existing {
            Some(existing) => {
                info!("Updating preseed '{}' (ID: {})", name, existing.id);
                self.transport.put(&preseed_path(existing.id), &body).await?
            }
            None => {
                info!("Creating preseed '{}'", name);
                self.transport.post(PRESEED_PATH, &body).await?
            }
        };

        decode(response)
    }
}
