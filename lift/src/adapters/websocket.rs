//! Normalizes `ApiGatewayWebsocketProxyRequest` events into `trigger=WEBSOCKET`
//! requests, carrying `connectionId`/`routeKey`/`stage`/`domainName` through
//! `metadata` for the WebSocket extension (§4.8) to pick back up.

use std::collections::HashMap;

use lift_core::request::Request;
use lift_core::trigger::Trigger;
use serde_json::Value;

use super::{body_bytes, headers_from_value, str_field, string_map};
use crate::errors::AdapterError;

pub struct WebSocketAdapter;

impl super::EventAdapter for WebSocketAdapter {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn can_handle(&self, event: &Value) -> bool {
        event.pointer("/requestContext/connectionId").is_some()
            && event.pointer("/requestContext/routeKey").is_some()
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let route_key = str_field(event, "/requestContext/routeKey").unwrap_or("$default");
        let connection_id = str_field(event, "/requestContext/connectionId").unwrap_or("");
        let stage = str_field(event, "/requestContext/stage").unwrap_or("");
        let domain_name = str_field(event, "/requestContext/domainName").unwrap_or("");

        // The lifecycle route keys normalize to their own pseudo-methods;
        // any other `routeKey` is an application-defined message route.
        let method = match route_key {
            "$connect" => "CONNECT".to_string(),
            "$disconnect" => "DISCONNECT".to_string(),
            _ => "MESSAGE".to_string(),
        };
        let path = format!("/{route_key}");
        let query_params = string_map(event.get("queryStringParameters"));
        let headers = headers_from_value(event.get("headers"));
        let is_base64 = event.get("isBase64Encoded").and_then(Value::as_bool).unwrap_or(false);
        let body = body_bytes(event.get("body").and_then(Value::as_str), is_base64);

        let mut metadata: HashMap<String, Value> = HashMap::new();
        metadata.insert("connectionId".to_string(), Value::String(connection_id.to_string()));
        metadata.insert("routeKey".to_string(), Value::String(route_key.to_string()));
        metadata.insert("stage".to_string(), Value::String(stage.to_string()));
        metadata.insert("domainName".to_string(), Value::String(domain_name.to_string()));

        Ok(Request::new(
            Trigger::WebSocket,
            method,
            path,
            headers,
            query_params,
            body,
            metadata,
            event.clone(),
        ))
    }
}
