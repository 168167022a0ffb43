//! The normalized request view (§3).

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use serde_json::Value;

use crate::trigger::Trigger;

/// The normalized view of one invocation, produced by the Event Adapter
/// Registry and never mutated again except for `pathParams`, which the
/// router populates post-match.
///
/// # Construction
///
/// `Request::new` takes every field by value and copies them into the
/// struct. This is deliberate: the historical WebSocket query-parameter
/// defect this lineage tracks had two candidate root causes, and one of them
/// was a request type that held a reference into the adapter's intermediate
/// representation instead of owning a copy. `Request` always owns its data;
/// adapters that want zero-copy behavior internally must still materialize
/// owned maps before calling `Request::new`.
#[derive(Debug, Clone)]
pub struct Request {
    trigger: Trigger,
    method: String,
    path: String,
    headers: HeaderMap,
    query_params: HashMap<String, String>,
    path_params: HashMap<String, String>,
    body: Bytes,
    metadata: HashMap<String, Value>,
    raw: Value,
}

impl Request {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trigger: Trigger,
        method: impl Into<String>,
        path: impl Into<String>,
        headers: HeaderMap,
        query_params: HashMap<String, String>,
        body: Bytes,
        metadata: HashMap<String, Value>,
        raw: Value,
    ) -> Self {
        Self {
            trigger,
            method: method.into(),
            path: path.into(),
            headers,
            query_params,
            path_params: HashMap::new(),
            body,
            metadata,
            raw,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Populated by the router post-match; the only field mutable after
    /// adapter normalization (§3 invariant).
    pub fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Extracts a `map<string,string>` from a JSON value that may have arrived
/// as either `map<string,string>` or `map<string,dynamic>`.
///
/// This is the regression guard named directly in the specification's open
/// question: some Lambda event dialects (notably API Gateway's websocket
/// `queryStringParameters`) serialize query maps with non-string JSON
/// values in the wild, and an extractor that only accepted `map<string,
/// string>` silently dropped every query parameter for those payloads. Both
/// candidate shapes are accepted here unconditionally, and values that are
/// not already strings are stringified rather than rejected.
pub fn string_map_from_value(value: Option<&Value>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(Value::Object(map)) = value else {
        return out;
    };
    for (k, v) in map {
        let s = match v {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        out.insert(k.clone(), s);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_map_accepts_string_values() {
        let v = serde_json::json!({"Authorization": "Bearer xyz"});
        let map = string_map_from_value(Some(&v));
        assert_eq!(map.get("Authorization").unwrap(), "Bearer xyz");
    }

    #[test]
    fn string_map_accepts_dynamic_values() {
        // map<string,dynamic> shape: non-string JSON values must still be
        // captured, not silently dropped.
        let v = serde_json::json!({"count": 3, "flag": true});
        let map = string_map_from_value(Some(&v));
        assert_eq!(map.get("count").unwrap(), "3");
        assert_eq!(map.get("flag").unwrap(), "true");
    }

    #[test]
    fn string_map_is_idempotent() {
        let v = serde_json::json!({"a": "1", "b": 2});
        let first = string_map_from_value(Some(&v));
        let second = string_map_from_value(Some(&v));
        assert_eq!(first, second);
    }

    #[test]
    fn string_map_of_missing_value_is_empty() {
        assert!(string_map_from_value(None).is_empty());
    }

    #[test]
    fn request_fields_are_owned_copies() {
        let raw = serde_json::json!({"a": 1});
        let req = Request::new(
            Trigger::Http,
            "GET",
            "/x",
            HeaderMap::new(),
            HashMap::new(),
            Bytes::new(),
            HashMap::new(),
            raw.clone(),
        );
        // Dropping the original `raw` value must not affect the request's
        // copy -- there is no borrow relationship between them.
        drop(raw);
        assert_eq!(req.raw()["a"], 1);
    }
}
