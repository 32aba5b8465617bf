//! Name → ID resolution
//!
//! The server's filter language only covers single predicates, so secondary
//! keys (type, arch, interface identifier) are matched client-side by
//! scanning the listing.

use crate::common::query::{
    decode, field_text, find_record, machine_by_name_path, machine_interfaces_path, machine_path,
    query_records, IMAGE_LISTING_PATH, PRESEED_LISTING_PATH,
};
use crate::error::MrpError;
use crate::models::{Image, ImageType, Interface, Machine, Preseed, PreseedType};
use crate::mrp_trait::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, Span};

/// Looks up server records by their human-readable keys
#[derive(Clone)]
pub struct Resolver {
    transport: Arc<dyn Transport>,
    span: Span,
}

impl Resolver {
    pub fn new(transport: Arc<dyn Transport>, span: Span) -> Self {
        Self { transport, span }
    }

    /// Resolve a machine name to its id
    ///
    /// Exactly one machine must match: zero matches is `NotFound`, more than
    /// one is `AmbiguousName`.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn resolve_machine_id(&self, name: &str) -> Result<u64, MrpError> {
        let machines: Vec<Machine> =
            query_records(self.transport.as_ref(), &machine_by_name_path(name)).await?;

        match machines.as_slice() {
            [machine] => {
                debug!("Machine ID: {}", machine.id);
                Ok(machine.id)
            }
            [] => Err(MrpError::NotFound(format!(
                "no machine found with name '{}'",
                name
            ))),
            _ => Err(MrpError::AmbiguousName {
                name: name.to_string(),
                count: machines.len(),
            }),
        }
    }

    /// Fetch a machine record by id
    #[instrument(parent = &self.span, skip(self))]
    pub async fn get_machine(&self, machine_id: u64) -> Result<Machine, MrpError> {
        let value = self.transport.get(&machine_path(machine_id)).await?;
        decode(value)
    }

    /// Interfaces of a machine; records that cannot be decoded are skipped
    #[instrument(parent = &self.span, skip(self))]
    pub async fn list_interfaces(&self, machine_id: u64) -> Result<Vec<Interface>, MrpError> {
        let records: Vec<Value> =
            query_records(self.transport.as_ref(), &machine_interfaces_path(machine_id)).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| match decode::<Interface>(record) {
                Ok(interface) => Some(interface),
                Err(e) => {
                    debug!("Skipping interface record of machine {}: {}", machine_id, e);
                    None
                }
            })
            .collect())
    }

    /// Find a machine's interface by its identifier (e.g. `eth1`)
    ///
    /// Records without an identifier never match.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn resolve_interface(
        &self,
        machine_id: u64,
        identifier: &str,
    ) -> Result<Interface, MrpError> {
        find_record::<Interface>(
            self.transport.as_ref(),
            &machine_interfaces_path(machine_id),
            |record| field_text(record, "identifier").as_deref() == Some(identifier),
        )
        .await?
        .ok_or_else(|| {
            MrpError::NotFound(format!(
                "couldn't find interface {} for machine ID {}",
                identifier, machine_id
            ))
        })
    }

    /// Find a preseed by name, optionally restricted to one type
    ///
    /// `Ok(None)` means the preseed does not exist yet. The returned record
    /// never carries `content`, even if the listing included it.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn resolve_preseed(
        &self,
        name: &str,
        type_filter: Option<PreseedType>,
    ) -> Result<Option<Preseed>, MrpError> {
        let found: Option<Preseed> =
            find_record(self.transport.as_ref(), PRESEED_LISTING_PATH, |record| {
                field_text(record, "name").as_deref() == Some(name)
                    && type_filter.is_none_or(|t| {
                        field_text(record, "type")
                            .is_some_and(|found| found.eq_ignore_ascii_case(t.as_str()))
                    })
            })
            .await?;

        Ok(found.map(|mut preseed| {
            preseed.content = None;
            debug!("Preseed ID: {}", preseed.id);
            preseed
        }))
    }

    pub async fn resolve_preseed_id(
        &self,
        name: &str,
        type_filter: Option<PreseedType>,
    ) -> Result<Option<u64>, MrpError> {
        Ok(self
            .resolve_preseed(name, type_filter)
            .await?
            .map(|preseed| preseed.id))
    }

    /// Find an image by its (description, type, arch) natural key
    ///
    /// `Ok(None)` means no such image has been uploaded.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn resolve_image(
        &self,
        description: &str,
        image_type: ImageType,
        arch: &str,
    ) -> Result<Option<Image>, MrpError> {
        find_record(self.transport.as_ref(), IMAGE_LISTING_PATH, |record| {
            field_text(record, "description").as_deref() == Some(description)
                && field_text(record, "type").as_deref() == Some(image_type.as_str())
                && field_text(record, "arch").as_deref() == Some(arch)
        })
        .await
    }
}
