//! Machine operations for MockMrpServer
//!
//! Handles machine lookup by name, parameter updates, state changes and interfaces

use super::{lock, MockMrpServer};
use crate::error::MrpError;
use crate::models::*;
use serde_json::{json, Value};

/// Extract the name from a `q=(= name "<urlencoded>")` filter
fn name_filter(query: &str) -> Option<String> {
    query
        .split('&')
        .find_map(|param| param.strip_prefix("q="))
        .and_then(|q| q.strip_prefix("(= name \""))
        .and_then(|q| q.strip_suffix("\")"))
        .map(|name| {
            urlencoding::decode(name)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| name.to_string())
        })
}

pub fn list_machines(server: &MockMrpServer, query: &str) -> Result<Value, MrpError> {
    let name = name_filter(query);
    let machines: Vec<Machine> = lock(&server.machines)
        .values()
        .filter(|m| name.as_ref().is_none_or(|n| &m.name == n))
        .cloned()
        .collect();
    Ok(serde_json::to_value(machines)?)
}

pub fn get_machine(server: &MockMrpServer, path: &str, id: Option<u64>) -> Result<Value, MrpError> {
    let machines = lock(&server.machines);
    let machine = id
        .and_then(|id| machines.get(&id))
        .ok_or_else(|| server.error("GET", path, 404, "machine not found"))?;
    Ok(serde_json::to_value(machine)?)
}

pub fn update_machine(
    server: &MockMrpServer,
    path: &str,
    id: Option<u64>,
    body: Option<&Value>,
) -> Result<Value, MrpError> {
    let mut machines = lock(&server.machines);
    let machine = id
        .and_then(|id| machines.get_mut(&id))
        .ok_or_else(|| server.error("PUT", path, 404, "machine not found"))?;

    let fields = body
        .and_then(Value::as_object)
        .ok_or_else(|| server.error("PUT", path, 400, "expected a JSON object"))?;
    for (key, value) in fields {
        machine.extra.insert(key.clone(), value.clone());
    }

    Ok(serde_json::to_value(&*machine)?)
}

pub fn list_interfaces(
    server: &MockMrpServer,
    path: &str,
    id: Option<u64>,
) -> Result<Value, MrpError> {
    let interfaces = lock(&server.interfaces);
    let list = id
        .and_then(|id| interfaces.get(&id))
        .ok_or_else(|| server.error("GET", path, 404, "machine not found"))?;
    Ok(serde_json::to_value(list)?)
}

pub fn change_state(
    server: &MockMrpServer,
    path: &str,
    id: Option<u64>,
    body: Option<&Value>,
) -> Result<Value, MrpError> {
    let transition: StateTransition = body
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| server.error("POST", path, 400, "missing state"))?;

    let mut machines = lock(&server.machines);
    let machine = id
        .and_then(|id| machines.get_mut(&id))
        .ok_or_else(|| server.error("POST", path, 404, "machine not found"))?;
    machine
        .extra
        .insert("state".to_string(), Value::String(transition.state.clone()));

    Ok(json!({ "state": transition.state }))
}
