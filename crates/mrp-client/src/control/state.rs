//! Machine provisioning parameters and state transitions

use super::image::ImageControl;
use super::preseed::PreseedControl;
use super::resolver::Resolver;
use crate::common::query::{machine_path, machine_state_path};
use crate::error::MrpError;
use crate::models::{ImageType, Machine, ProvisioningParameters, StateTransition};
use crate::mrp_trait::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, Span};

/// What the caller wants changed on a machine
///
/// `None` and empty strings leave the corresponding server field untouched.
/// `netboot_enabled` defaults to `true` when omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRequest {
    pub preseed_name: Option<String>,
    pub initrd_description: Option<String>,
    pub kernel_description: Option<String>,
    pub kernel_opts: Option<String>,
    pub arch: Option<String>,
    pub subarch: Option<String>,
    pub netboot_enabled: Option<bool>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Builds sparse machine updates and triggers provisioning
#[derive(Clone)]
pub struct StateControl {
    transport: Arc<dyn Transport>,
    resolver: Resolver,
    images: ImageControl,
    preseeds: PreseedControl,
    span: Span,
}

impl StateControl {
    pub fn new(transport: Arc<dyn Transport>, span: Span) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&transport), span.clone()),
            images: ImageControl::new(Arc::clone(&transport), span.clone()),
            preseeds: PreseedControl::new(Arc::clone(&transport), span.clone()),
            transport,
            span,
        }
    }

    /// Resolve every named reference in `request` into the update payload
    ///
    /// Nothing is sent; any failed lookup aborts the whole assembly.
    pub async fn build_parameters(
        &self,
        request: &ParameterRequest,
    ) -> Result<ProvisioningParameters, MrpError> {
        let mut parameters = ProvisioningParameters::default();

        let initrd = non_empty(&request.initrd_description);
        let kernel = non_empty(&request.kernel_description);
        let arch = non_empty(&request.arch);

        if (initrd.is_some() || kernel.is_some()) && arch.is_none() {
            return Err(MrpError::InvalidArgument(
                "arch is required to look up kernel and initrd images".to_string(),
            ));
        }
        let arch = arch.unwrap_or_default();

        if let Some(description) = initrd {
            parameters.initrd_id = Some(
                self.images
                    .get_image_id(description, ImageType::Initrd, arch)
                    .await?,
            );
        }

        if let Some(description) = kernel {
            parameters.kernel_id = Some(
                self.images
                    .get_image_id(description, ImageType::Kernel, arch)
                    .await?,
            );
        }

        if let Some(name) = non_empty(&request.preseed_name) {
            parameters.preseed_id = Some(self.preseeds.get_preseed_id(name).await?);
        }

        parameters.subarch = non_empty(&request.subarch).map(str::to_string);
        parameters.kernel_opts = non_empty(&request.kernel_opts).map(str::to_string);
        parameters.netboot_enabled = Some(request.netboot_enabled.unwrap_or(true));

        Ok(parameters)
    }

    /// Set provisioning parameters on a machine with a single partial PUT
    #[instrument(parent = &self.span, skip(self))]
    pub async fn set_machine_parameters(
        &self,
        machine_id: u64,
        request: &ParameterRequest,
    ) -> Result<Value, MrpError> {
        let parameters = self.build_parameters(request).await?;
        let body = serde_json::to_value(&parameters)?;

        let response = self.transport.put(&machine_path(machine_id), &body).await?;
        debug!("Machine {} parameters response: {}", machine_id, response);
        Ok(response)
    }

    /// Ask MrP to move the machine to the `provision` state
    ///
    /// Returns the server's acknowledgment; it does not mean the machine booted.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn provision_machine(&self, machine_id: u64) -> Result<Value, MrpError> {
        let body = serde_json::to_value(StateTransition::provision())?;

        let response = self
            .transport
            .post(&machine_state_path(machine_id), &body)
            .await?;
        info!("Provisioning requested for machine {}", machine_id);
        Ok(response)
    }

    /// The machine record; `Machine::parameters` holds what was last set
    pub async fn get_parameters(&self, machine_id: u64) -> Result<Machine, MrpError> {
        self.resolver.get_machine(machine_id).await
    }
}
