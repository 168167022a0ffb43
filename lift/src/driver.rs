//! The Invocation Driver (§4.7): the `LiftApp` builder and `lift::run`,
//! wrapping `lambda_runtime::run` the way `#[risten::main]` wraps
//! `#[tokio::main]` in this lineage -- except here the wrapping happens in
//! a plain async function because the entry point additionally needs to own
//! the `LiftApp` value.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use lift_core::collaborators::{ConnectionStore, Logger, ManagementApi, MetricsCollector, Tracer};
use lift_core::context::{CancellationToken, Context};
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::DynMiddleware;
use lift_core::trigger::Trigger;
use lift_std::collaborators::{StdTracer, TracingLogger, TracingMetrics};
use lift_std::middleware::{LoggerMiddleware, RecoveryMiddleware, RequestIdMiddleware, TracingMiddleware};
use lift_std::routing::{PathRouter, RouteGroup, WebSocketRouter};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::AdapterRegistry;
use crate::config::LiftConfig;

/// Registers routes, holds the default collaborator implementations, and
/// dispatches one invocation at a time (§4.7).
pub struct LiftApp {
    registry: AdapterRegistry,
    router: PathRouter,
    ws_router: WebSocketRouter,
    config: LiftConfig,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn MetricsCollector>,
    tracer: Arc<dyn Tracer>,
    management_api: Option<Arc<dyn ManagementApi>>,
    connection_store: Option<Arc<dyn ConnectionStore>>,
    default_middlewares: Vec<Arc<dyn DynMiddleware>>,
}

impl LiftApp {
    pub fn new(config: LiftConfig) -> Self {
        let default_middlewares: Vec<Arc<dyn DynMiddleware>> = vec![
            Arc::new(RequestIdMiddleware),
            Arc::new(LoggerMiddleware),
            Arc::new(RecoveryMiddleware),
            Arc::new(TracingMiddleware),
        ];
        Self {
            registry: AdapterRegistry::with_builtins(),
            router: PathRouter::new(),
            ws_router: WebSocketRouter::new(),
            config,
            logger: Arc::new(TracingLogger::new()),
            metrics: Arc::new(TracingMetrics),
            tracer: Arc::new(StdTracer),
            management_api: None,
            connection_store: None,
            default_middlewares,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn with_management_api(mut self, management_api: Arc<dyn ManagementApi>) -> Self {
        self.management_api = Some(management_api);
        self
    }

    pub fn with_connection_store(mut self, connection_store: Arc<dyn ConnectionStore>) -> Self {
        self.connection_store = Some(connection_store);
        self
    }

    /// Appends `middleware` to the default chain applied ahead of every
    /// route registered without an explicit override (CORS, auth, rate
    /// limiting, ...); relative ordering with the always-on built-ins
    /// (request-id, logger, recovery, tracing) is preserved per §4.3.
    pub fn with_middleware(mut self, middleware: Arc<dyn DynMiddleware>) -> Self {
        self.default_middlewares.push(middleware);
        self
    }

    pub fn config(&self) -> &LiftConfig {
        &self.config
    }

    /// Registers an HTTP route using the app's default middleware chain.
    pub fn route(&mut self, method: impl Into<String>, pattern: impl Into<String>, handler: Arc<dyn Handler + Send + Sync>) -> &mut Self {
        self.route_with(method, pattern, Vec::new(), handler)
    }

    /// Registers an HTTP route with additional route-specific middleware
    /// appended after the app's defaults (§4.2 group composition).
    pub fn route_with(
        &mut self,
        method: impl Into<String>,
        pattern: impl Into<String>,
        extra: Vec<Arc<dyn DynMiddleware>>,
        handler: Arc<dyn Handler + Send + Sync>,
    ) -> &mut Self {
        let mut middlewares = self.default_middlewares.clone();
        middlewares.extend(extra);
        self.router.register(method, pattern, middlewares, handler);
        self
    }

    /// Exposes a [`RouteGroup`] rooted at the app's router. Routes
    /// registered through it still only carry the middlewares passed to
    /// [`RouteGroup::route`]/[`RouteGroup::nest`] -- use [`LiftApp::route`]
    /// for routes that should pick up the app's default chain.
    pub fn group(&mut self) -> RouteGroup<'_> {
        RouteGroup::new(&mut self.router)
    }

    /// Registers a `$connect` handler behind the app's default middleware
    /// chain (§4.3), exactly as [`LiftApp::route`] does for HTTP routes.
    pub fn on_connect(&mut self, handler: Arc<dyn Handler + Send + Sync>) -> &mut Self {
        self.ws_router.on_connect(self.default_middlewares.clone(), handler);
        self
    }

    pub fn on_disconnect(&mut self, handler: Arc<dyn Handler + Send + Sync>) -> &mut Self {
        self.ws_router.on_disconnect(self.default_middlewares.clone(), handler);
        self
    }

    pub fn on_message(&mut self, route_key: impl Into<String>, handler: Arc<dyn Handler + Send + Sync>) -> &mut Self {
        self.ws_router.on(route_key, self.default_middlewares.clone(), handler);
        self
    }

    /// Runs the full invocation driver flow for one event (§4.7 steps 1-6).
    pub async fn invoke(&self, event: Value, deadline: Option<Duration>) -> Value {
        let request_id = Uuid::new_v4().to_string();
        let redact = self.config.get_environment().redacts_errors();

        let request = match self.registry.adapt(&event) {
            Ok(request) => request,
            Err(err) => {
                let lift_err: LiftError = err.into();
                self.logger.error("event adapter rejected payload", &serde_json::json!({"request_id": request_id}));
                return self.project_error(Trigger::Http, &lift_err.with_request_id(request_id), redact);
            }
        };

        let trigger = request.trigger();

        if request.body().len() > self.config.get_max_request_bytes() {
            let err = LiftError::new(ErrorCode::PayloadTooLarge, "request body exceeds the configured limit")
                .with_request_id(request_id);
            return self.project_error(trigger, &err, redact);
        }

        let cancellation = deadline.map(CancellationToken::new).unwrap_or_else(CancellationToken::unbounded);

        let mut ctx = Context::new(request, request_id.clone(), cancellation, self.logger.clone(), self.metrics.clone(), self.tracer.clone());
        if let Some(api) = &self.management_api {
            ctx.set_management_api(api.clone());
        }
        if let Some(store) = &self.connection_store {
            ctx.set_connection_store(store.clone());
        }

        let resolved = if trigger == Trigger::WebSocket {
            let route_key = ctx
                .request()
                .metadata_value("routeKey")
                .and_then(Value::as_str)
                .unwrap_or("$default")
                .to_string();
            self.ws_router.resolve(&route_key).map_err(|e| LiftError::new(ErrorCode::NotFound, e.to_string()))
        } else {
            // Queue/Object-Store/Event-Bus/Stream requests carry `method=""`,
            // `path=""` (§4.1); their actual dispatch key travels in
            // metadata instead, the same way the WebSocket route key does.
            let (method, path) = match trigger {
                Trigger::Queue | Trigger::ObjectStore | Trigger::EventBus | Trigger::Stream => (
                    ctx.request().metadata_value("dispatchMethod").and_then(Value::as_str).unwrap_or("").to_string(),
                    ctx.request().metadata_value("dispatchPath").and_then(Value::as_str).unwrap_or("").to_string(),
                ),
                _ => (ctx.request().method().to_string(), ctx.request().path().to_string()),
            };
            self.router.resolve(&method, &path).map(|(handler, params)| {
                ctx.request_mut().set_path_params(params);
                handler
            }).map_err(|e| match e {
                lift_std::routing::RoutingError::NotFound { .. } => LiftError::new(ErrorCode::NotFound, e.to_string()),
                lift_std::routing::RoutingError::MethodNotAllowed { .. } => LiftError::new(ErrorCode::MethodNotAllowed, e.to_string()),
            })
        };

        let handler = match resolved {
            Ok(handler) => handler,
            Err(err) => return self.project_error(trigger, &err.with_request_id(request_id), redact),
        };

        match handler.handle(&mut ctx).await {
            Ok(()) => self.project_response(trigger, &ctx),
            Err(err) => self.project_error(trigger, &err.with_request_id(request_id.clone()), redact),
        }
    }

    fn project_response(&self, trigger: Trigger, ctx: &Context) -> Value {
        match trigger {
            Trigger::Http | Trigger::WebSocket => {
                let body = ctx.response().body_bytes().unwrap_or_default();
                serde_json::json!({
                    "statusCode": ctx.response().status_code(),
                    "headers": headers_to_json(ctx.response().headers()),
                    "body": String::from_utf8_lossy(&body),
                    "isBase64Encoded": false,
                })
            }
            // Asynchronous triggers (queue, object store, event bus, timer,
            // stream) have no host-visible response shape; a successful
            // invocation is communicated by returning without error.
            _ => Value::Null,
        }
    }

    fn project_error(&self, trigger: Trigger, err: &LiftError, redact: bool) -> Value {
        match trigger {
            Trigger::Http | Trigger::WebSocket => {
                serde_json::json!({
                    "statusCode": err.status_code(),
                    "headers": {"content-type": "application/json"},
                    "body": err.to_body(redact).to_string(),
                    "isBase64Encoded": false,
                })
            }
            _ => err.to_body(redact),
        }
    }
}

fn headers_to_json(headers: &http::HeaderMap) -> Value {
    let mut map = serde_json::Map::new();
    for (name, value) in headers {
        if let Ok(v) = value.to_str() {
            map.insert(name.as_str().to_string(), Value::String(v.to_string()));
        }
    }
    Value::Object(map)
}

fn remaining_from_deadline(deadline_epoch_ms: i64) -> Duration {
    let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0);
    let remaining_ms = (deadline_epoch_ms - now_ms).max(0);
    Duration::from_millis(remaining_ms as u64)
}

/// Wraps `lambda_runtime::run`, dispatching each invocation through
/// [`LiftApp::invoke`]. On a fatal error inside the driver itself -- outside
/// the recovery middleware, e.g. a panic escaping `invoke` -- the host
/// process exits per `lambda_runtime`'s own failure handling, which is the
/// `INTERNAL_ERROR` 500 fallback required by §4.7 step 6 for synchronous
/// triggers (asynchronous triggers instead rely on Lambda's native retry and
/// DLQ mechanics for a propagated `Err`).
pub async fn run(app: LiftApp) -> Result<(), LambdaError> {
    let app = Arc::new(app);
    lambda_runtime::run(lambda_runtime::service_fn(move |event: LambdaEvent<Value>| {
        let app = app.clone();
        async move {
            let (payload, lambda_ctx) = (event.payload, event.context);
            let deadline = lambda_ctx.deadline;
            let remaining = if deadline > 0 { Some(remaining_from_deadline(deadline as i64)) } else { None };
            Ok::<Value, LambdaError>(app.invoke(payload, remaining).await)
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler_adapter::from_context;

    fn app() -> LiftApp {
        LiftApp::new(LiftConfig::new())
    }

    #[tokio::test]
    async fn dispatches_http_get_to_registered_route() {
        let mut app = app();
        app.route(
            "GET",
            "/health",
            from_context(|ctx: &mut Context| async move {
                ctx.response_mut().set_json_body(&serde_json::json!({"ok": true})).unwrap();
                Ok(())
            }),
        );
        let event = serde_json::json!({
            "httpMethod": "GET",
            "path": "/health",
            "headers": {},
            "queryStringParameters": null,
            "body": null,
            "isBase64Encoded": false
        });
        let response = app.invoke(event, None).await;
        assert_eq!(response["statusCode"], 200);
        assert!(response["body"].as_str().unwrap().contains("\"ok\":true"));
    }

    #[tokio::test]
    async fn unmatched_route_projects_not_found() {
        let app = app();
        let event = serde_json::json!({
            "httpMethod": "GET",
            "path": "/nope",
            "headers": {}
        });
        let response = app.invoke(event, None).await;
        assert_eq!(response["statusCode"], 404);
    }

    #[tokio::test]
    async fn unrecognized_event_projects_internal_error() {
        let app = app();
        let response = app.invoke(serde_json::json!({"nonsense": true}), None).await;
        assert_eq!(response["statusCode"], 500);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_dispatch() {
        let mut app = LiftApp::new(LiftConfig::new().max_request_bytes(8));
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls2 = calls.clone();
        app.route(
            "POST",
            "/users",
            from_context(move |_ctx: &mut Context| {
                let calls = calls2.clone();
                async move {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok(())
                }
            }),
        );
        let event = serde_json::json!({
            "httpMethod": "POST",
            "path": "/users",
            "headers": {},
            "queryStringParameters": null,
            "body": "{\"name\":\"a very long name that blows the limit\"}",
            "isBase64Encoded": false
        });
        let response = app.invoke(event, None).await;
        assert_eq!(response["statusCode"], 413);
        let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn queue_trigger_returns_null_on_success() {
        let mut app = app();
        app.route(
            "MESSAGE",
            "arn:aws:sqs:us-east-1:111122223333:my-queue",
            from_context(|_ctx: &mut Context| async move { Ok(()) }),
        );
        let event = serde_json::json!({
            "Records": [{"eventSource": "aws:sqs", "eventSourceARN": "arn:aws:sqs:us-east-1:111122223333:my-queue", "body": "{}"}]
        });
        let response = app.invoke(event, None).await;
        assert_eq!(response, Value::Null);
    }
}
