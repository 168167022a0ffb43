//! The mutable response buffer (§3).

use bytes::Bytes;
use http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// The body of a [`Response`]: either an opaque byte sequence the driver
/// passes through untouched, or a value the driver JSON-encodes on the way
/// out, per §6.
#[derive(Debug, Clone)]
pub enum Body {
    Bytes(Bytes),
    Json(Value),
    Empty,
}

/// The mutable response buffer a handler and its surrounding middleware
/// build up over the lifetime of one invocation.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    headers: HeaderMap,
    body: Body,
    committed: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status_code: 200,
            headers: HeaderMap::new(),
            body: Body::Empty,
            committed: false,
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn set_status(&mut self, status_code: u16) -> &mut Self {
        self.status_code = status_code;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_header(
        &mut self,
        name: http::header::HeaderName,
        value: http::header::HeaderValue,
    ) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_bytes_body(&mut self, bytes: Bytes) -> &mut Self {
        self.body = Body::Bytes(bytes);
        self
    }

    /// Writes a value to the response body, JSON-encoding it on output and
    /// setting `Content-Type: application/json` if the caller hasn't already
    /// set a `Content-Type` header (§6).
    pub fn set_json_body<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.body = Body::Json(value);
        if !self.headers.contains_key(http::header::CONTENT_TYPE) {
            self.headers.insert(
                http::header::CONTENT_TYPE,
                http::header::HeaderValue::from_static("application/json"),
            );
        }
        Ok(self)
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Declares the response final: later middleware unwinding the chain
    /// should not overwrite it.
    pub fn commit(&mut self) -> &mut Self {
        self.committed = true;
        self
    }

    /// Serializes the body into bytes for the host's expected return shape.
    pub fn body_bytes(&self) -> Result<Bytes, serde_json::Error> {
        match &self.body {
            Body::Bytes(b) => Ok(b.clone()),
            Body::Json(v) => Ok(Bytes::from(serde_json::to_vec(v)?)),
            Body::Empty => Ok(Bytes::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_200() {
        assert_eq!(Response::new().status_code(), 200);
    }

    #[test]
    fn json_body_sets_content_type_when_absent() {
        let mut resp = Response::new();
        resp.set_json_body(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn json_body_does_not_override_explicit_content_type() {
        let mut resp = Response::new();
        resp.set_header(
            http::header::CONTENT_TYPE,
            http::header::HeaderValue::from_static("text/plain"),
        );
        resp.set_json_body(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn commit_is_sticky() {
        let mut resp = Response::new();
        assert!(!resp.is_committed());
        resp.commit();
        assert!(resp.is_committed());
    }
}
