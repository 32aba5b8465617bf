//! Mock MrP server for unit testing
//!
//! This module provides an in-memory implementation of `Transport` that can be
//! used in unit tests without requiring a running MrP instance.
//!
//! The mock routes requests the way the real server does:
//! - `machine.rs` - machine lookup, parameters, state, interfaces
//! - `upload.rs` - image and preseed listing and upload
//! - `helpers.rs` - helper functions for building records

mod helpers;
mod machine;
mod upload;

pub use helpers::*;

use crate::client::MrpClient;
use crate::common::FileUpload;
use crate::error::MrpError;
use crate::models::*;
use crate::mrp_trait::Transport;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by the mock, kept for assertions
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub file: Option<FileUpload>,
    pub fields: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn is_write(&self) -> bool {
        self.method != "GET"
    }
}

/// Mock MrP server for testing
///
/// Stores records in memory, assigns ids from a counter, and records every
/// request so tests can assert on what was sent.
#[derive(Clone)]
pub struct MockMrpServer {
    pub(crate) base_url: String,
    // In-memory storage for records
    pub(crate) machines: Arc<Mutex<BTreeMap<u64, Machine>>>,
    pub(crate) interfaces: Arc<Mutex<BTreeMap<u64, Vec<Interface>>>>,
    pub(crate) images: Arc<Mutex<BTreeMap<u64, Image>>>,
    pub(crate) preseeds: Arc<Mutex<BTreeMap<u64, Preseed>>>,
    // Canned failures keyed by (method, path)
    pub(crate) failures: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    pub(crate) requests: Arc<Mutex<Vec<RecordedRequest>>>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<u64>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockMrpServer {
    /// Create a new empty mock server
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            machines: Arc::new(Mutex::new(BTreeMap::new())),
            interfaces: Arc::new(Mutex::new(BTreeMap::new())),
            images: Arc::new(Mutex::new(BTreeMap::new())),
            preseeds: Arc::new(Mutex::new(BTreeMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// An `MrpClient` backed by this mock
    pub fn client(&self) -> MrpClient {
        MrpClient::with_transport(Arc::new(self.clone()), tracing::Span::none())
    }

    /// Add a machine and its interfaces (for test setup)
    pub fn add_machine(&self, machine: Machine, interfaces: Vec<Interface>) {
        lock(&self.interfaces).insert(machine.id, interfaces);
        self.bump_next_id(machine.id);
        lock(&self.machines).insert(machine.id, machine);
    }

    /// Add an image to the mock store (for test setup)
    pub fn add_image(&self, image: Image) {
        self.bump_next_id(image.id);
        lock(&self.images).insert(image.id, image);
    }

    /// Add a preseed to the mock store (for test setup)
    pub fn add_preseed(&self, preseed: Preseed) {
        self.bump_next_id(preseed.id);
        lock(&self.preseeds).insert(preseed.id, preseed);
    }

    /// Answer `method path` with an HTTP error instead of routing it
    pub fn fail_with(&self, method: &str, path: &str, status: u16, body: &str) {
        lock(&self.failures).insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Number of non-GET requests received
    pub fn write_count(&self) -> usize {
        lock(&self.requests).iter().filter(|r| r.is_write()).count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    pub fn machine(&self, id: u64) -> Option<Machine> {
        lock(&self.machines).get(&id).cloned()
    }

    pub fn images(&self) -> Vec<Image> {
        lock(&self.images).values().cloned().collect()
    }

    pub fn preseeds(&self) -> Vec<Preseed> {
        lock(&self.preseeds).values().cloned().collect()
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = lock(&self.next_id);
        let current = *id;
        *id += 1;
        current
    }

    fn bump_next_id(&self, used: u64) {
        let mut id = lock(&self.next_id);
        if *id <= used {
            *id = used + 1;
        }
    }

    pub(crate) fn error(&self, method: &'static str, path: &str, status: u16, body: &str) -> MrpError {
        MrpError::Status {
            method,
            url: format!("{}{}", self.base_url, path),
            status,
            body: body.to_string(),
        }
    }

    fn record(&self, request: RecordedRequest) -> Result<(), MrpError> {
        let failure = lock(&self.failures)
            .get(&(request.method.to_string(), request.path.clone()))
            .cloned();
        let (method, path) = (request.method, request.path.clone());
        lock(&self.requests).push(request);

        match failure {
            Some((status, body)) => Err(self.error(method, &path, status, &body)),
            None => Ok(()),
        }
    }

    fn route(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, MrpError> {
        let (resource, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = resource
            .trim_start_matches("/api/v1/")
            .split('/')
            .collect();

        match (method, segments.as_slice()) {
            ("GET", ["machine"]) => machine::list_machines(self, query),
            ("GET", ["machine", id]) => machine::get_machine(self, path, parse_id(id)),
            ("PUT", ["machine", id]) => machine::update_machine(self, path, parse_id(id), body),
            ("GET", ["machine", id, "interface"]) => {
                machine::list_interfaces(self, path, parse_id(id))
            }
            ("POST", ["machine", id, "state"]) => {
                machine::change_state(self, path, parse_id(id), body)
            }
            ("GET", ["image"]) => upload::list_images(self),
            ("GET", ["preseed"]) => upload::list_preseeds(self),
            ("GET", ["preseed", id]) => upload::get_preseed(self, path, parse_id(id)),
            ("POST", ["preseed"]) => upload::create_preseed(self, path, body),
            ("PUT", ["preseed", id]) => upload::update_preseed(self, path, parse_id(id), body),
            ("DELETE", ["preseed", id]) => upload::delete_preseed(self, path, parse_id(id)),
            ("DELETE", ["image", id]) => upload::delete_image(self, path, parse_id(id)),
            _ => Err(self.error(method, path, 404, "Not Found")),
        }
    }
}

fn parse_id(segment: &str) -> Option<u64> {
    segment.parse().ok()
}

#[async_trait::async_trait]
impl Transport for MockMrpServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), MrpError> {
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value, MrpError> {
        self.record(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            body: None,
            file: None,
            fields: Vec::new(),
        })?;
        self.route("GET", path, None)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        self.record(RecordedRequest {
            method: "PUT",
            path: path.to_string(),
            body: Some(body.clone()),
            file: None,
            fields: Vec::new(),
        })?;
        self.route("PUT", path, Some(body))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MrpError> {
        self.record(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
            file: None,
            fields: Vec::new(),
        })?;
        self.route("POST", path, Some(body))
    }

    async fn post_multipart(
        &self,
        path: &str,
        file: FileUpload,
        fields: Vec<(String, String)>,
    ) -> Result<Value, MrpError> {
        self.record(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: None,
            file: Some(file.clone()),
            fields: fields.clone(),
        })?;

        if path.trim_end_matches('/') == crate::common::query::IMAGE_PATH {
            upload::create_image(self, path, &file, &fields)
        } else {
            Err(self.error("POST", path, 404, "Not Found"))
        }
    }

    async fn delete(&self, path: &str) -> Result<Value, MrpError> {
        self.record(RecordedRequest {
            method: "DELETE",
            path: path.to_string(),
            body: None,
            file: None,
            fields: Vec::new(),
        })?;
        self.route("DELETE", path, None)
    }
}
