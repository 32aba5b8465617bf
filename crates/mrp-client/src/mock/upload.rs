//! Image and preseed operations for MockMrpServer

use super::{lock, MockMrpServer};
use crate::common::FileUpload;
use crate::error::MrpError;
use crate::models::*;
use serde_json::{Map, Value};

pub fn list_images(server: &MockMrpServer) -> Result<Value, MrpError> {
    let images: Vec<Image> = lock(&server.images).values().cloned().collect();
    Ok(serde_json::to_value(images)?)
}

pub fn create_image(
    server: &MockMrpServer,
    path: &str,
    file: &FileUpload,
    fields: &[(String, String)],
) -> Result<Value, MrpError> {
    let sidecar = fields
        .iter()
        .find(|(name, _)| name == "q")
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| server.error("POST", path, 400, "missing q field"))?;
    let new: NewImage = serde_json::from_str(sidecar)?;

    let mut extra = Map::new();
    extra.insert("filename".to_string(), Value::String(file.file_name.clone()));

    let image = Image {
        id: server.next_id(),
        description: new.description,
        image_type: new.image_type,
        arch: new.arch,
        known_good: Some(new.known_good),
        public: Some(new.public),
        extra,
    };
    lock(&server.images).insert(image.id, image.clone());
    Ok(serde_json::to_value(image)?)
}

pub fn delete_image(server: &MockMrpServer, path: &str, id: Option<u64>) -> Result<Value, MrpError> {
    id.and_then(|id| lock(&server.images).remove(&id))
        .ok_or_else(|| server.error("DELETE", path, 404, "image not found"))?;
    Ok(Value::Null)
}

/// Listing answers never include preseed content
pub fn list_preseeds(server: &MockMrpServer) -> Result<Value, MrpError> {
    let preseeds: Vec<Preseed> = lock(&server.preseeds)
        .values()
        .cloned()
        .map(|mut preseed| {
            preseed.content = None;
            preseed
        })
        .collect();
    Ok(serde_json::to_value(preseeds)?)
}

pub fn get_preseed(server: &MockMrpServer, path: &str, id: Option<u64>) -> Result<Value, MrpError> {
    let preseeds = lock(&server.preseeds);
    let preseed = id
        .and_then(|id| preseeds.get(&id))
        .ok_or_else(|| server.error("GET", path, 404, "preseed not found"))?;
    Ok(serde_json::to_value(preseed)?)
}

fn payload(server: &MockMrpServer, method: &'static str, path: &str, body: Option<&Value>) -> Result<PreseedPayload, MrpError> {
    let body = body.ok_or_else(|| server.error(method, path, 400, "missing body"))?;
    Ok(serde_json::from_value(body.clone())?)
}

pub fn create_preseed(server: &MockMrpServer, path: &str, body: Option<&Value>) -> Result<Value, MrpError> {
    let payload = payload(server, "POST", path, body)?;

    let mut preseeds = lock(&server.preseeds);
    if preseeds.values().any(|p| p.name == payload.name) {
        return Err(server.error("POST", path, 409, "preseed name already in use"));
    }

    let preseed = Preseed {
        id: server.next_id(),
        name: payload.name,
        preseed_type: payload.preseed_type,
        content: Some(payload.content),
        description: payload.description,
        known_good: Some(payload.known_good),
        public: Some(payload.public),
        extra: Map::new(),
    };
    preseeds.insert(preseed.id, preseed.clone());
    Ok(serde_json::to_value(preseed)?)
}

pub fn update_preseed(
    server: &MockMrpServer,
    path: &str,
    id: Option<u64>,
    body: Option<&Value>,
) -> Result<Value, MrpError> {
    let payload = payload(server, "PUT", path, body)?;

    let mut preseeds = lock(&server.preseeds);
    let preseed = id
        .and_then(|id| preseeds.get_mut(&id))
        .ok_or_else(|| server.error("PUT", path, 404, "preseed not found"))?;

    preseed.name = payload.name;
    preseed.preseed_type = payload.preseed_type;
    preseed.content = Some(payload.content);
    if payload.description.is_some() {
        preseed.description = payload.description;
    }
    preseed.known_good = Some(payload.known_good);
    preseed.public = Some(payload.public);

    Ok(serde_json::to_value(&*preseed)?)
}

pub fn delete_preseed(server: &MockMrpServer, path: &str, id: Option<u64>) -> Result<Value, MrpError> {
    id.and_then(|id| lock(&server.preseeds).remove(&id))
        .ok_or_else(|| server.error("DELETE", path, 404, "preseed not found"))?;
    Ok(Value::Null)
}
