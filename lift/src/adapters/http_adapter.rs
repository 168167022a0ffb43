//! Normalizes both API Gateway HTTP dialects -- REST API (v1,
//! `ApiGatewayProxyRequest`) and HTTP API (v2, `ApiGatewayV2httpRequest`)
//! -- into `trigger=HTTP` (§4.1).

use lift_core::request::Request;
use lift_core::trigger::Trigger;
use serde_json::Value;

use super::{body_bytes, headers_from_value, str_field, string_map};
use crate::errors::AdapterError;

pub struct HttpAdapter;

impl HttpAdapter {
    fn is_v2(event: &Value) -> bool {
        event.pointer("/requestContext/http").is_some()
    }

    fn is_v1(event: &Value) -> bool {
        event.get("httpMethod").and_then(Value::as_str).is_some()
    }
}

impl super::EventAdapter for HttpAdapter {
    fn name(&self) -> &'static str {
        "http"
    }

    fn can_handle(&self, event: &Value) -> bool {
        // WebSocket events also carry `requestContext` but are claimed by
        // `WebSocketAdapter` first (registered ahead of this one); guard
        // here too so direct use of this adapter alone stays correct.
        if event.pointer("/requestContext/connectionId").is_some() {
            return false;
        }
        Self::is_v2(event) || Self::is_v1(event)
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let (method, path) = if Self::is_v2(event) {
            (
                str_field(event, "/requestContext/http/method").unwrap_or("GET").to_string(),
                str_field(event, "/rawPath").unwrap_or("/").to_string(),
            )
        } else {
            (
                str_field(event, "/httpMethod").unwrap_or("GET").to_string(),
                str_field(event, "/path").unwrap_or("/").to_string(),
            )
        };

        let query_params = string_map(event.get("queryStringParameters"));
        let headers = headers_from_value(event.get("headers"));
        let is_base64 = event.get("isBase64Encoded").and_then(Value::as_bool).unwrap_or(false);
        let body = body_bytes(event.get("body").and_then(Value::as_str), is_base64);

        Ok(Request::new(
            Trigger::Http,
            method,
            path,
            headers,
            query_params,
            body,
            std::collections::HashMap::new(),
            event.clone(),
        ))
    }
}
