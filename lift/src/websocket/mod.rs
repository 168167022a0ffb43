//! The WebSocket extension (§4.8): lifecycle route keys, the active
//! connection counter decorator, and the connection-facing API this module
//! adds to [`Context`].

mod connection_counter;

pub use connection_counter::CountingConnectionStore;

use async_trait::async_trait;
use lift_core::collaborators::WebSocketConnection;
use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use serde_json::Value;

const CONNECT_ROUTE: &str = "$connect";
const DISCONNECT_ROUTE: &str = "$disconnect";

fn not_configured(what: &str) -> LiftError {
    LiftError::new(ErrorCode::InternalError, format!("no {what} configured for this invocation"))
}

/// Connection-facing API added to [`Context`] for invocations dispatched
/// through the WebSocket sub-router.
#[async_trait]
pub trait WebSocketContextExt {
    fn connection_id(&self) -> Option<&str>;
    fn route_key(&self) -> Option<&str>;
    fn stage(&self) -> Option<&str>;
    fn management_endpoint(&self) -> Option<String>;
    fn is_connect(&self) -> bool;
    fn is_disconnect(&self) -> bool;
    fn is_message(&self) -> bool;

    async fn send_message(&self, connection_id: &str, bytes: &[u8]) -> Result<(), LiftError>;
    async fn send_json(&self, connection_id: &str, value: &Value) -> Result<(), LiftError>;
    async fn broadcast(&self, connection_ids: &[String], bytes: &[u8]) -> Result<(), LiftError>;
    async fn disconnect(&self, connection_id: &str) -> Result<(), LiftError>;
    async fn get_connection_info(&self, connection_id: &str) -> Result<Option<WebSocketConnection>, LiftError>;
}

#[async_trait]
impl WebSocketContextExt for Context {
    fn connection_id(&self) -> Option<&str> {
        self.request().metadata_value("connectionId").and_then(Value::as_str)
    }

    fn route_key(&self) -> Option<&str> {
        self.request().metadata_value("routeKey").and_then(Value::as_str)
    }

    fn stage(&self) -> Option<&str> {
        self.request().metadata_value("stage").and_then(Value::as_str)
    }

    fn management_endpoint(&self) -> Option<String> {
        let domain = self.request().metadata_value("domainName")?.as_str()?;
        if domain.is_empty() {
            return None;
        }
        let stage = self.stage().unwrap_or("");
        Some(format!("https://{domain}/{stage}"))
    }

    fn is_connect(&self) -> bool {
        self.route_key() == Some(CONNECT_ROUTE)
    }

    fn is_disconnect(&self) -> bool {
        self.route_key() == Some(DISCONNECT_ROUTE)
    }

    fn is_message(&self) -> bool {
        !self.is_connect() && !self.is_disconnect()
    }

    async fn send_message(&self, connection_id: &str, bytes: &[u8]) -> Result<(), LiftError> {
        let api = self.management_api().ok_or_else(|| not_configured("management api"))?;
        api.post_to_connection(connection_id, bytes).await
    }

    async fn send_json(&self, connection_id: &str, value: &Value) -> Result<(), LiftError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| LiftError::new(ErrorCode::InternalError, "failed to encode message").with_cause(e))?;
        self.send_message(connection_id, &bytes).await
    }

    async fn broadcast(&self, connection_ids: &[String], bytes: &[u8]) -> Result<(), LiftError> {
        let mut failures = 0usize;
        for id in connection_ids {
            if self.send_message(id, bytes).await.is_err() {
                failures += 1;
            }
        }
        if failures > 0 {
            return Err(LiftError::new(
                ErrorCode::InternalError,
                format!("failed to deliver to {failures} of {} connections", connection_ids.len()),
            ));
        }
        Ok(())
    }

    async fn disconnect(&self, connection_id: &str) -> Result<(), LiftError> {
        let api = self.management_api().ok_or_else(|| not_configured("management api"))?;
        api.delete_connection(connection_id).await?;
        if let Some(store) = self.connection_store() {
            store.delete(connection_id).await?;
        }
        Ok(())
    }

    async fn get_connection_info(&self, connection_id: &str) -> Result<Option<WebSocketConnection>, LiftError> {
        let store = self.connection_store().ok_or_else(|| not_configured("connection store"))?;
        store.get(connection_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::collaborators::{ConnectionStore, Logger, ManagementApi, Metric, MetricsCollector, SpanGuard, Tracer};
    use lift_core::context::CancellationToken;
    use lift_core::request::Request;
    use lift_core::trigger::Trigger;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NoopLogger;
    impl Logger for NoopLogger {
        fn debug(&self, _: &str, _: &Value) {}
        fn info(&self, _: &str, _: &Value) {}
        fn warn(&self, _: &str, _: &Value) {}
        fn error(&self, _: &str, _: &Value) {}
        fn with(&self, _: Value) -> Box<dyn Logger> {
            Box::new(NoopLogger)
        }
    }

    struct NoopMetric;
    impl Metric for NoopMetric {
        fn record(&self, _: f64, _: &[(&str, &str)]) {}
    }

    struct NoopMetrics;
    impl MetricsCollector for NoopMetrics {
        fn counter(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
        fn gauge(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
        fn histogram(&self, _: &str) -> Box<dyn Metric> {
            Box::new(NoopMetric)
        }
    }

    struct NoopSpan;
    impl SpanGuard for NoopSpan {
        fn add_annotation(&mut self, _: &str, _: &str) {}
    }

    struct NoopTracer;
    impl Tracer for NoopTracer {
        fn start_span(&self, _: &str) -> Box<dyn SpanGuard> {
            Box::new(NoopSpan)
        }
    }

    struct RecordingManagementApi {
        sent: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
        fail_for: Option<&'static str>,
    }

    #[async_trait]
    impl ManagementApi for RecordingManagementApi {
        async fn post_to_connection(&self, connection_id: &str, data: &[u8]) -> Result<(), LiftError> {
            if self.fail_for == Some(connection_id) {
                return Err(LiftError::new(ErrorCode::BadGateway, "gone"));
            }
            self.sent.lock().unwrap().push((connection_id.to_string(), data.to_vec()));
            Ok(())
        }
        async fn delete_connection(&self, _connection_id: &str) -> Result<(), LiftError> {
            Ok(())
        }
        async fn get_connection(&self, _connection_id: &str) -> Result<Value, LiftError> {
            Ok(Value::Null)
        }
    }

    struct StubConnectionStore {
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl ConnectionStore for StubConnectionStore {
        async fn save(&self, _connection: WebSocketConnection) -> Result<(), LiftError> {
            Ok(())
        }
        async fn delete(&self, _id: &str) -> Result<(), LiftError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn get(&self, id: &str) -> Result<Option<WebSocketConnection>, LiftError> {
            Ok(Some(WebSocketConnection {
                id: id.to_string(),
                user_id: None,
                tenant_id: None,
                created_at_epoch_secs: 0,
                last_active_at_epoch_secs: 0,
                ttl_secs: 3600,
                metadata: HashMap::new(),
            }))
        }
        async fn list_by_user(&self, _user_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
            Ok(Vec::new())
        }
        async fn list_by_tenant(&self, _tenant_id: &str) -> Result<Vec<WebSocketConnection>, LiftError> {
            Ok(Vec::new())
        }
        async fn count_active(&self) -> Result<u64, LiftError> {
            Ok(0)
        }
    }

    fn ctx(route_key: &str) -> Context {
        let mut metadata = HashMap::new();
        metadata.insert("connectionId".to_string(), Value::String("conn-1".to_string()));
        metadata.insert("routeKey".to_string(), Value::String(route_key.to_string()));
        metadata.insert("stage".to_string(), Value::String("prod".to_string()));
        metadata.insert("domainName".to_string(), Value::String("abc.execute-api.us-east-1.amazonaws.com".to_string()));
        Context::new(
            Request::new(
                Trigger::WebSocket,
                "MESSAGE",
                route_key,
                http::HeaderMap::new(),
                HashMap::new(),
                bytes::Bytes::new(),
                metadata,
                Value::Null,
            ),
            "req-1",
            CancellationToken::unbounded(),
            Arc::new(NoopLogger),
            Arc::new(NoopMetrics),
            Arc::new(NoopTracer),
        )
    }

    #[test]
    fn route_key_predicates() {
        assert!(ctx(CONNECT_ROUTE).is_connect());
        assert!(ctx(DISCONNECT_ROUTE).is_disconnect());
        assert!(ctx("chat.send").is_message());
    }

    #[test]
    fn management_endpoint_combines_domain_and_stage() {
        let c = ctx("$default");
        assert_eq!(c.management_endpoint().unwrap(), "https://abc.execute-api.us-east-1.amazonaws.com/prod");
    }

    #[tokio::test]
    async fn send_message_without_management_api_fails() {
        let c = ctx("$default");
        let err = c.send_message("conn-1", b"hi").await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn send_json_round_trips_through_management_api() {
        let mut c = ctx("$default");
        let api = Arc::new(RecordingManagementApi {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: None,
        });
        c.set_management_api(api.clone());
        c.send_json("conn-1", &serde_json::json!({"hello": "world"})).await.unwrap();
        let sent = api.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "conn-1");
    }

    #[tokio::test]
    async fn broadcast_reports_partial_failures() {
        let mut c = ctx("$default");
        let api = Arc::new(RecordingManagementApi {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: Some("conn-2"),
        });
        c.set_management_api(api);
        let err = c
            .broadcast(&["conn-1".to_string(), "conn-2".to_string()], b"ping")
            .await
            .unwrap_err();
        assert!(err.message().contains("1 of 2"));
    }

    #[tokio::test]
    async fn disconnect_clears_both_collaborators() {
        let mut c = ctx(DISCONNECT_ROUTE);
        c.set_management_api(Arc::new(RecordingManagementApi {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: None,
        }));
        let store = Arc::new(StubConnectionStore {
            deletes: AtomicUsize::new(0),
        });
        c.set_connection_store(store.clone());
        c.disconnect("conn-1").await.unwrap();
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_connection_info_without_store_fails() {
        let c = ctx("$default");
        let err = c.get_connection_info("conn-1").await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::InternalError);
    }
}
