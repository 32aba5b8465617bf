//! MrP API models
//!
//! These models match the JSON records served under `/api/v1/`.
//! Fields the client does not interpret are kept in `extra` so a record
//! serializes back to what the server sent.

use crate::error::MrpError;
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Machine model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Machine {
    pub fn arch(&self) -> Option<&str> {
        self.extra.get("arch").and_then(Value::as_str)
    }

    /// Current provisioning state (e.g. `ready`, `provision`)
    pub fn state(&self) -> Option<&str> {
        self.extra.get("state").and_then(Value::as_str)
    }

    /// Provisioning parameters currently stored on the machine record
    pub fn parameters(&self) -> ProvisioningParameters {
        let id = |key: &str| self.extra.get(key).and_then(Value::as_u64);
        let text = |key: &str| {
            self.extra
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        ProvisioningParameters {
            initrd_id: id("initrd_id"),
            kernel_id: id("kernel_id"),
            preseed_id: id("preseed_id"),
            subarch: text("subarch"),
            kernel_opts: text("kernel_opts"),
            netboot_enabled: self.extra.get("netboot_enabled").and_then(Value::as_bool),
        }
    }
}

/// Network interface model (from `/api/v1/machine/{id}/interface`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub identifier: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_ipv4: Option<String>,
    /// `None`: field absent. `Some(None)`: field present and null.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub netmaskv4: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wraps any present value (including null) in `Some`
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Reads a string or a number as text; null and any other JSON type as `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// IPv4 netmask state of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Netmask {
    Configured(String),
    /// The server reports the netmask as null
    NotConfigured,
    /// The record has no netmask field at all
    Missing,
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Netmask::Configured(mask) => f.write_str(mask),
            Netmask::NotConfigured => f.write_str("null"),
            Netmask::Missing => Ok(()),
        }
    }
}

impl Interface {
    /// Leased IPv4 address, if any
    pub fn ip(&self) -> Option<&str> {
        self.lease_ipv4.as_deref().filter(|ip| !ip.is_empty())
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref().filter(|mac| !mac.is_empty())
    }

    pub fn netmask(&self) -> Netmask {
        match &self.netmaskv4 {
            Some(Some(mask)) => Netmask::Configured(mask.clone()),
            Some(None) => Netmask::NotConfigured,
            None => Netmask::Missing,
        }
    }

    /// IPv4 network of the leased address, host bits cleared (e.g. `10.0.0.0/24`)
    pub fn network(&self) -> Result<Ipv4Network, MrpError> {
        let name = self.identifier().unwrap_or("<unnamed>");
        let ip = self.ip().ok_or_else(|| {
            MrpError::Incomplete(format!("interface {} has no lease_ipv4", name))
        })?;
        let mask = match self.netmask() {
            Netmask::Configured(mask) => mask,
            Netmask::NotConfigured | Netmask::Missing => {
                return Err(MrpError::Incomplete(format!(
                    "interface {} has no netmaskv4",
                    name
                )));
            }
        };

        let ip: Ipv4Addr = ip.parse().map_err(|e| {
            MrpError::Incomplete(format!("invalid lease_ipv4 '{}': {}", ip, e))
        })?;
        let mask_addr: Ipv4Addr = mask.parse().map_err(|e| {
            MrpError::Incomplete(format!("invalid netmaskv4 '{}': {}", mask, e))
        })?;

        // Rejects non-contiguous masks
        let host = Ipv4Network::with_netmask(ip, mask_addr)
            .map_err(|e| MrpError::Incomplete(format!("invalid netmaskv4 '{}': {}", mask, e)))?;
        Ipv4Network::new(host.network(), host.prefix())
            .map_err(|e| MrpError::Incomplete(format!("invalid netmaskv4 '{}': {}", mask, e)))
    }
}

/// Boot image kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    Kernel,
    Initrd,
    Bootloader,
}

impl ImageType {
    pub const ALL: [ImageType; 3] = [ImageType::Kernel, ImageType::Initrd, ImageType::Bootloader];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Kernel => "Kernel",
            ImageType::Initrd => "Initrd",
            ImageType::Bootloader => "Bootloader",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = MrpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                MrpError::InvalidArgument(format!(
                    "image type is '{}'; must be one of Kernel, Initrd, Bootloader",
                    s
                ))
            })
    }
}

/// Image model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub description: String,
    #[serde(rename = "type")]
    pub image_type: ImageType,
    pub arch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_good: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// JSON sidecar (`q` field) sent with a multipart image upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImage {
    pub description: String,
    #[serde(rename = "type")]
    pub image_type: ImageType,
    pub arch: String,
    pub known_good: bool,
    pub public: bool,
}

/// Installer answer file flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreseedType {
    Preseed,
    Kickstart,
}

impl PreseedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreseedType::Preseed => "preseed",
            PreseedType::Kickstart => "kickstart",
        }
    }
}

impl fmt::Display for PreseedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreseedType {
    type Err = MrpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preseed" => Ok(PreseedType::Preseed),
            "kickstart" => Ok(PreseedType::Kickstart),
            _ => Err(MrpError::InvalidArgument(format!(
                "preseed type is '{}'; must be one of preseed, kickstart",
                s
            ))),
        }
    }
}

/// Preseed model
///
/// `content` is only populated by a direct fetch or an upload answer;
/// listings never carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preseed {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub preseed_type: PreseedType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_good: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a preseed create (POST) or update (PUT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreseedPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub preseed_type: PreseedType,
    pub public: bool,
    pub known_good: bool,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sparse machine update: only `Some` fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initrd_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preseed_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subarch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_opts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netboot_enabled: Option<bool>,
}

/// Body of `POST /api/v1/machine/{id}/state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub state: String,
}

impl StateTransition {
    pub fn provision() -> Self {
        Self {
            state: "provision".to_string(),
        }
    }
}
