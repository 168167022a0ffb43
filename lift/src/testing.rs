//! Testing utilities for Lift (§10.5).
//!
//! Lets downstream consumers unit-test their own handlers without standing
//! up real AWS collaborators.
//!
//! # Features
//!
//! - [`MockLogger`]: records every logged line for inspection
//! - [`MockMetrics`]: records every emitted metric
//! - [`InMemoryConnectionStore`]: an in-process [`ConnectionStore`] for WebSocket tests
//! - [`TestRequest`]: a builder for constructing [`Request`] values without an event adapter

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use lift_core::collaborators::{ConnectionStore, Logger, Metric, MetricsCollector, WebSocketConnection};
use lift_core::error::LiftError;
use lift_core::request::Request;
use lift_core::trigger::Trigger;
use serde_json::Value;

// ============================================================================
// Mock Logger
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedLine {
    pub level: &'static str,
    pub message: String,
    pub fields: Value,
}

/// A [`Logger`] that records every call instead of emitting anywhere.
pub struct MockLogger {
    lines: Arc<Mutex<Vec<LoggedLine>>>,
    bound_fields: Value,
}

impl Default for MockLogger {
    fn default() -> Self {
        Self {
            lines: Arc::default(),
            bound_fields: Value::Object(serde_json::Map::new()),
        }
    }
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LoggedLine> {
        self.lines.lock().unwrap().clone()
    }

    fn record(&self, level: &'static str, message: &str, fields: &Value) {
        let mut merged = self.bound_fields.clone();
        if let (Some(obj), Value::Object(extra)) = (merged.as_object_mut(), fields) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        self.lines.lock().unwrap().push(LoggedLine {
            level,
            message: message.to_string(),
            fields: merged,
        });
    }
}

impl Logger for MockLogger {
    fn debug(&self, message: &str, fields: &Value) {
        self.record("debug", message, fields);
    }
    fn info(&self, message: &str, fields: &Value) {
        self.record("info", message, fields);
    }
    fn warn(&self, message: &str, fields: &Value) {
        self.record("warn", message, fields);
    }
    fn error(&self, message: &str, fields: &Value) {
        self.record("error", message, fields);
    }
    fn with(&self, fields: Value) -> Box<dyn Logger> {
        Box::new(MockLogger {
            lines: self.lines.clone(),
            bound_fields: fields,
        })
    }
}

// ============================================================================
// Mock Metrics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMetric {
    pub name: String,
    pub kind: &'static str,
    pub value: f64,
    pub tags: Vec<(String, String)>,
}

struct RecordingMetric {
    name: String,
    kind: &'static str,
    sink: Arc<Mutex<Vec<RecordedMetric>>>,
}

impl Metric for RecordingMetric {
    fn record(&self, value: f64, tags: &[(&str, &str)]) {
        self.sink.lock().unwrap().push(RecordedMetric {
            name: self.name.clone(),
            kind: self.kind,
            value,
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
    }
}

/// A [`MetricsCollector`] that records every emitted counter/gauge/histogram value.
#[derive(Default)]
pub struct MockMetrics {
    recorded: Arc<Mutex<Vec<RecordedMetric>>>,
}

impl MockMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<RecordedMetric> {
        self.recorded.lock().unwrap().clone()
    }
}

impl MetricsCollector for MockMetrics {
    fn counter(&self, name: &str) -> Box<dyn Metric> {
        Box::new(RecordingMetric {
            name: name.to_string(),
            kind: "counter",
            sink: self.recorded.clone(),
        })
    }
    fn gauge(&self, name: &str) -> Box<dyn Metric> {
        Box::new(RecordingMetric {
            name: name.to_string(),
            kind: "gauge",
            sink: self.recorded.clone(),
        })
    }
    fn histogram(&self, name: &str) -> Box<dyn Metric> {
        Box::new(RecordingMetric {
            name: name.to_string(),
            kind: "histogram",
            sink: self.recorded.clone(),
        })
    }
}

// ============================================================================
// In-memory Connection Store
// ============================================================================

/// An in-process [`ConnectionStore`] for unit-testing WebSocket handlers.
#[derive(Default)]
pub struct InMemoryConnectionStore {
    connections: Mutex<HashMap<String, WebSocketConnection>>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn save(&self, connection: WebSocketConnection) -> Result<(), LiftError> {
        self.connections.lock().unwrap().insert(connection.id.clone(), connection);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), LiftError> {
        self.connections.lock().unwrap().remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<WebSocketConnection>, LiftError> {
        Ok(self.connections.lock().unwrap().get(id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.tenant_id.as_deref() == Some(tenant_id))
            .cloned()
            .collect())
    }

    async fn count_active(&self) -> Result<u64, LiftError> {
        Ok(self.connections.lock().unwrap().len() as u64)
    }
}

// ============================================================================
// Test Request builder
// ============================================================================

/// Builds a [`Request`] directly, bypassing the Event Adapter Registry, for
/// tests that want to exercise a router or middleware chain without a real
/// Lambda event payload.
pub struct TestRequest {
    trigger: Trigger,
    method: String,
    path: String,
    headers: HeaderMap,
    query_params: HashMap<String, String>,
    body: Bytes,
    metadata: HashMap<String, Value>,
}

impl TestRequest {
    pub fn http(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            trigger: Trigger::Http,
            method: method.into(),
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: HashMap::new(),
            body: Bytes::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::try_from(name),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn json_body<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.body = Bytes::from(serde_json::to_vec(value).expect("serializable test body"));
        self
    }

    pub fn build(self) -> Request {
        Request::new(
            self.trigger,
            self.method,
            self.path,
            self.headers,
            self.query_params,
            self.body,
            self.metadata,
            Value::Null,
        )
    }
}
