//! Boot image lookup and upload

use super::resolver::Resolver;
use crate::common::query::{decode, IMAGE_PATH};
use crate::common::FileUpload;
use crate::error::MrpError;
use crate::models::{Image, ImageType, NewImage};
use crate::mrp_trait::Transport;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, Span};

/// Get-or-create controller for kernels, initrds and bootloaders
#[derive(Clone)]
pub struct ImageControl {
    transport: Arc<dyn Transport>,
    resolver: Resolver,
    span: Span,
}

impl ImageControl {
    pub fn new(transport: Arc<dyn Transport>, span: Span) -> Self {
        let resolver = Resolver::new(Arc::clone(&transport), span.clone());
        Self {
            transport,
            resolver,
            span,
        }
    }

    /// Look up an image by natural key; `Ok(None)` if it was never uploaded
    pub async fn find_image(
        &self,
        description: &str,
        image_type: ImageType,
        arch: &str,
    ) -> Result<Option<Image>, MrpError> {
        self.resolver
            .resolve_image(description, image_type, arch)
            .await
    }

    /// Id of an image that is expected to exist
    #[instrument(parent = &self.span, skip(self))]
    pub async fn get_image_id(
        &self,
        description: &str,
        image_type: ImageType,
        arch: &str,
    ) -> Result<u64, MrpError> {
        match self.find_image(description, image_type, arch).await? {
            Some(image) => Ok(image.id),
            None => Err(MrpError::NotFound(format!(
                "no {} image of description '{}' for architecture '{}'",
                image_type, description, arch
            ))),
        }
    }

    /// Return the image matching (description, type, arch), uploading it first if absent
    ///
    /// An existing image is returned as-is: neither the file nor the flags
    /// are compared with the stored record.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn ensure_image(
        &self,
        image_type: ImageType,
        description: &str,
        arch: &str,
        path: Option<&Path>,
        public: bool,
        known_good: bool,
    ) -> Result<Image, MrpError> {
        if let Some(existing) = self.find_image(description, image_type, arch).await? {
            info!(
                "{} image '{}' for {} already exists (ID: {})",
                image_type, description, arch, existing.id
            );
            return Ok(existing);
        }

        let path = path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                MrpError::InvalidArgument(format!(
                    "{} image '{}' for {} does not exist and no file was given",
                    image_type, description, arch
                ))
            })?;

        let bytes = tokio::fs::read(path).await.map_err(|source| MrpError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let sidecar = NewImage {
            description: description.to_string(),
            image_type,
            arch: arch.to_string(),
            known_good,
            public,
        };
        let fields = vec![("q".to_string(), serde_json::to_string(&sidecar)?)];

        debug!("Uploading {} ({} bytes)", path.display(), bytes.len());
        let response = self
            .transport
            .post_multipart(IMAGE_PATH, FileUpload { file_name, bytes }, fields)
            .await?;

        let created: Image = decode(response)?;
        info!(
            "Uploaded {} image '{}' for {} (ID: {})",
            image_type, description, arch, created.id
        );
        Ok(created)
    }
}
