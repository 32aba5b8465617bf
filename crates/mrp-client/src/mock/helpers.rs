//! Helper functions for creating MrP records in tests

use crate::models::*;
use serde_json::Map;

/// Helper to create a Machine with no provisioning parameters set
pub fn test_machine(id: u64, name: &str) -> Machine {
    Machine {
        id,
        name: name.to_string(),
        interfaces: Vec::new(),
        extra: Map::new(),
    }
}

/// Helper to create an Interface
///
/// `netmask: None` produces a null `netmaskv4`, i.e. "not configured".
pub fn test_interface(identifier: &str, mac: &str, lease_ipv4: Option<&str>, netmask: Option<&str>) -> Interface {
    Interface {
        identifier: Some(identifier.to_string()),
        mac: Some(mac.to_string()),
        lease_ipv4: lease_ipv4.map(str::to_string),
        netmaskv4: Some(netmask.map(str::to_string)),
        extra: Map::new(),
    }
}

/// Helper to create an Image
pub fn test_image(id: u64, description: &str, image_type: ImageType, arch: &str) -> Image {
    Image {
        id,
        description: description.to_string(),
        image_type,
        arch: arch.to_string(),
        known_good: Some(false),
        public: Some(false),
        extra: Map::new(),
    }
}

/// Helper to create a Preseed with content
pub fn test_preseed(id: u64, name: &str, preseed_type: PreseedType, content: &str) -> Preseed {
    Preseed {
        id,
        name: name.to_string(),
        preseed_type,
        content: Some(content.to_string()),
        description: None,
        known_good: Some(false),
        public: Some(false),
        extra: Map::new(),
    }
}
