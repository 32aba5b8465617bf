//! Mr. Provisioner (MrP) REST API Client
//!
//! A Rust client library for the MrP bare-metal provisioning server.
//! Resolves machines, interfaces, images and preseeds by name, uploads boot
//! images and installer answer files idempotently, and drives a machine into
//! the `provision` state.
//!
//! # Example
//!
//! ```no_run
//! use mrp_client::{ImageType, MrpClient, ParameterRequest, DEFAULT_TIMEOUT};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = MrpClient::new(
//!     "http://192.168.0.3:5000".to_string(),
//!     "your-api-token".to_string(),
//!     DEFAULT_TIMEOUT,
//! )?;
//!
//! // Upload a kernel unless it is already there
//! let kernel = client
//!     .images()
//!     .ensure_image(ImageType::Kernel, "v5-arm64", "arm64", Some(std::path::Path::new("Image")), false, true)
//!     .await?;
//!
//! // Point the machine at it and provision
//! let machine_id = client.resolver().resolve_machine_id("rig7").await?;
//! let request = ParameterRequest {
//!     kernel_description: Some(kernel.description),
//!     arch: Some("arm64".to_string()),
//!     subarch: Some("efi".to_string()),
//!     ..Default::default()
//! };
//! client.state().set_machine_parameters(machine_id, &request).await?;
//! client.state().provision_machine(machine_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Resolution**: machine name → id (exactly one match), interface by identifier
//! - **Upsert**: images by (description, type, arch), preseeds by name
//! - **Provisioning**: sparse parameter updates and the provision transition
//! - **Mocking**: in-memory `MockMrpServer` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod control;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod mrp_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::MrpClient;
pub use common::{FileUpload, HttpClient, DEFAULT_TIMEOUT};
pub use control::image::ImageControl;
pub use control::preseed::PreseedControl;
pub use control::resolver::Resolver;
pub use control::state::{ParameterRequest, StateControl};
pub use error::MrpError;
pub use models::*;
pub use mrp_trait::Transport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockMrpServer, RecordedRequest};
