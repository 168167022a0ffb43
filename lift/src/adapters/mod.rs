//! The Event Adapter Registry (§4.1).
//!
//! Detection inspects structural fingerprints of the opaque event `Value`
//! -- presence of `requestContext.http`, `requestContext.connectionId`,
//! `Records[].eventSource`, `detail-type`, ... -- rather than attempting to
//! deserialize into every known dialect and seeing what sticks. Adapters
//! never throw on payloads they cannot handle; they simply decline via
//! [`EventAdapter::can_handle`].

mod event_bus;
mod http_adapter;
mod object_store;
mod queue;
mod stream;
mod timer;
mod websocket;

pub use event_bus::EventBusAdapter;
pub use http_adapter::HttpAdapter;
pub use object_store::ObjectStoreAdapter;
pub use queue::QueueAdapter;
pub use stream::StreamAdapter;
pub use timer::TimerAdapter;
pub use websocket::WebSocketAdapter;

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use lift_core::request::{string_map_from_value, Request};
use serde_json::Value;

use crate::errors::AdapterError;

/// One entry in the registry (§4.1). Implementors must be side-effect free
/// and infallible in `can_handle` -- detection never consumes or mutates
/// the event.
pub trait EventAdapter: Send + Sync {
    /// A human-readable name, used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Cheap structural check; must not panic or error on arbitrary input.
    fn can_handle(&self, event: &Value) -> bool;

    /// Normalizes a recognized event into a [`Request`]. Only called after
    /// `can_handle` returned `true`.
    fn adapt(&self, event: &Value) -> Result<Request, AdapterError>;
}

/// The ordered adapter list; first match wins (§4.1). The seven built-in
/// trigger types each get exactly one adapter -- HTTP's single adapter
/// normalizes both the v1 and v2 API Gateway dialects internally.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn EventAdapter>>,
}

impl AdapterRegistry {
    /// The default registry, with all seven built-in adapters registered in
    /// a fixed, deliberately most-specific-first order so e.g. a WebSocket
    /// event (which also carries `requestContext.http`-shaped fields in
    /// some test fixtures) doesn't get misclassified as plain HTTP.
    pub fn with_builtins() -> Self {
        Self {
            adapters: vec![
                Box::new(WebSocketAdapter),
                Box::new(HttpAdapter),
                Box::new(QueueAdapter),
                Box::new(ObjectStoreAdapter),
                Box::new(StreamAdapter),
                Box::new(TimerAdapter),
                Box::new(EventBusAdapter),
            ],
        }
    }

    pub fn new() -> Self {
        Self { adapters: Vec::new() }
    }

    pub fn register(&mut self, adapter: Box<dyn EventAdapter>) {
        self.adapters.push(adapter);
    }

    /// Walks the registry; the first adapter whose `can_handle` returns
    /// `true` is used to `adapt`. Fails `UNSUPPORTED_EVENT` (via
    /// [`AdapterError::Unrecognized`]) if none match (§4.1).
    pub fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        for adapter in &self.adapters {
            if adapter.can_handle(event) {
                return adapter.adapt(event);
            }
        }
        Err(AdapterError::Unrecognized)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Builds a single-value `HeaderMap` from a JSON object of string keys to
/// string values; multi-value headers are explicitly out of scope (§4.1:
/// "multi-value join... last value wins").
pub(crate) fn headers_from_value(value: Option<&Value>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(Value::Object(map)) = value else {
        return headers;
    };
    for (k, v) in map {
        let Some(s) = v.as_str() else { continue };
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(k.as_str()), HeaderValue::from_str(s)) {
            headers.insert(name, value);
        }
    }
    headers
}

/// Decodes the Lambda proxy `body` field, respecting `isBase64Encoded`.
pub(crate) fn body_bytes(body: Option<&str>, is_base64_encoded: bool) -> Bytes {
    let Some(body) = body else {
        return Bytes::new();
    };
    if is_base64_encoded {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(body)
            .map(Bytes::from)
            .unwrap_or_else(|_| Bytes::copy_from_slice(body.as_bytes()))
    } else {
        Bytes::copy_from_slice(body.as_bytes())
    }
}

pub(crate) fn str_field<'a>(event: &'a Value, pointer: &str) -> Option<&'a str> {
    event.pointer(pointer).and_then(Value::as_str)
}

/// Wraps the raw record list (or, for non-batched dialects, the whole
/// event as a single-element list) under `metadata.records`, preserving
/// batch size (§4.1).
pub(crate) fn metadata_with_records(records: Vec<Value>) -> HashMap<String, Value> {
    let mut metadata = HashMap::new();
    metadata.insert("records".to_string(), Value::Array(records));
    metadata
}

pub(crate) fn string_map(value: Option<&Value>) -> std::collections::HashMap<String, String> {
    string_map_from_value(value)
}
