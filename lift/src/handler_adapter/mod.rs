//! The Handler Adapter (§4.4): six supported handler shapes, each turned
//! into a uniform [`Handler`] at registration time. Because Rust is
//! statically typed, "shape classification" here is a compile-time fact --
//! a handler closure with an unsupported shape simply fails to satisfy the
//! trait bounds of every `from_*` constructor and the build fails, rather
//! than deferring the discovery to a runtime panic.

use std::future::Future;
use std::sync::Arc;

use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::{Handler, HandlerFn};
use lift_core::validation::Validate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::BindingError;

fn write_result<R: Serialize>(ctx: &mut Context, value: &R) -> Result<(), LiftError> {
    ctx.response_mut()
        .set_json_body(value)
        .map_err(|e| LiftError::new(ErrorCode::InternalError, "failed to encode response body").with_cause(e))?;
    Ok(())
}

/// Decodes and validates the request body into `Input`, per §4.4/§4.5.
fn bind_input<Input: DeserializeOwned + Validate>(ctx: &Context) -> Result<Input, LiftError> {
    let body = ctx.request().body();
    if body.is_empty() {
        return Err(BindingError::EmptyBody.into());
    }
    let input: Input = serde_json::from_slice(body).map_err(BindingError::InvalidJson)?;
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(LiftError::new(ErrorCode::ValidationFailed, "validation failed")
            .with_details(serde_json::json!({"errors": lift_core::validation::errors_to_json(&errors)})));
    }
    Ok(input)
}

/// Shape 1: `Context -> error`.
pub fn from_context<F, Fut>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn(&mut Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LiftError>> + Send,
{
    Arc::new(HandlerFn(f))
}

/// Shape 2: `Context -> (Result, error)`.
pub fn from_context_result<F, Fut, R>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn(&mut Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, LiftError>> + Send,
    R: Serialize + Send + 'static,
{
    struct Adapter<F>(F);
    impl<F, Fut, R> Handler for Adapter<F>
    where
        F: Fn(&mut Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, LiftError>> + Send,
        R: Serialize + Send + 'static,
    {
        async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
            let result = (self.0)(ctx).await?;
            write_result(ctx, &result)
        }
    }
    Arc::new(Adapter(f))
}

/// Shape 3: `() -> error`.
pub fn from_noop<F, Fut>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LiftError>> + Send,
{
    struct Adapter<F>(F);
    impl<F, Fut> Handler for Adapter<F>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), LiftError>> + Send,
    {
        async fn handle(&self, _ctx: &mut Context) -> Result<(), LiftError> {
            (self.0)().await
        }
    }
    Arc::new(Adapter(f))
}

/// Shape 4: `() -> (Result, error)`.
pub fn from_noop_result<F, Fut, R>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, LiftError>> + Send,
    R: Serialize + Send + 'static,
{
    struct Adapter<F>(F);
    impl<F, Fut, R> Handler for Adapter<F>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, LiftError>> + Send,
        R: Serialize + Send + 'static,
    {
        async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
            let result = (self.0)().await?;
            write_result(ctx, &result)
        }
    }
    Arc::new(Adapter(f))
}

/// Shape 5: `Input -> error`, bound from the request body.
pub fn from_input<F, Fut, Input>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn(Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LiftError>> + Send,
    Input: DeserializeOwned + Validate + Send + 'static,
{
    struct Adapter<F, Input>(F, std::marker::PhantomData<Input>);
    impl<F, Fut, Input> Handler for Adapter<F, Input>
    where
        F: Fn(Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), LiftError>> + Send,
        Input: DeserializeOwned + Validate + Send + 'static,
    {
        async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
            let input = bind_input::<Input>(ctx)?;
            (self.0)(input).await
        }
    }
    Arc::new(Adapter(f, std::marker::PhantomData))
}

/// Shape 6: `Input -> (Result, error)`, bound from the request body.
pub fn from_input_result<F, Fut, Input, R>(f: F) -> Arc<dyn Handler + Send + Sync>
where
    F: Fn(Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, LiftError>> + Send,
    Input: DeserializeOwned + Validate + Send + 'static,
    R: Serialize + Send + 'static,
{
    struct Adapter<F, Input>(F, std::marker::PhantomData<Input>);
    impl<F, Fut, Input, R> Handler for Adapter<F, Input>
    where
        F: Fn(Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, LiftError>> + Send,
        Input: DeserializeOwned + Validate + Send + 'static,
        R: Serialize + Send + 'static,
    {
        async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
            let input = bind_input::<Input>(ctx)?;
            let result = (self.0)(input).await?;
            write_result(ctx, &result)
        }
    }
    Arc::new(Adapter(f, std::marker::PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::collaborators::{Logger, MetricsCollector, SpanGuard, Tracer};
    use lift_core::context::CancellationToken;
    use lift_core::request::Request;
    use lift_core::trigger::Trigger;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct NoopLogger;
    impl Logger for NoopLogger {
        fn debug(&self, _: &str, _: &serde_json::Value) {}
        fn info(&self, _: &str, _: &serde_json::Value) {}
        fn warn(&self, _: &str, _: &serde_json::Value) {}
        fn error(&self, _: &str, _: &serde_json::Value) {}
        fn with(&self, _: serde_json::Value) -> Box<dyn Logger> {
            Box::new(NoopLogger)
        }
    }

    struct NoopMetric;
    impl lift_core::collaborators::Metric for NoopMetric {
        fn record(&self, _: f64, _: &[(&str, &str)]) {}
    }

    struct NoopMetrics;
    impl MetricsCollector for NoopMetrics {
        fn counter(&self, _: &str) -> Box<dyn lift_core::collaborators::Metric> {
            Box::new(NoopMetric)
        }
        fn gauge(&self, _: &str) -> Box<dyn lift_core::collaborators::Metric> {
            Box::new(NoopMetric)
        }
        fn histogram(&self, _: &str) -> Box<dyn lift_core::collaborators::Metric> {
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

    fn test_ctx(body: &str) -> Context {
        Context::new(
            Request::new(
                Trigger::Http,
                "POST",
                "/",
                http::HeaderMap::new(),
                HashMap::new(),
                bytes::Bytes::from(body.to_string()),
                HashMap::new(),
                serde_json::Value::Null,
            ),
            "req-1",
            CancellationToken::unbounded(),
            Arc::new(NoopLogger),
            Arc::new(NoopMetrics),
            Arc::new(NoopTracer),
        )
    }

    #[derive(Deserialize)]
    struct CreateUser {
        name: String,
    }

    impl Validate for CreateUser {
        fn validate(&self) -> Vec<lift_core::validation::FieldError> {
            if self.name.is_empty() {
                vec![lift_core::validation::FieldError::new("name", "required", "name is required")]
            } else {
                Vec::new()
            }
        }
    }

    #[tokio::test]
    async fn context_only_shape_runs() {
        let handler = from_context(|ctx: &mut Context| async move {
            ctx.response_mut().set_status(204);
            Ok(())
        });
        let mut ctx = test_ctx("");
        handler.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().status_code(), 204);
    }

    #[tokio::test]
    async fn context_result_shape_writes_json_body() {
        let handler = from_context_result(|_ctx: &mut Context| async move { Ok(serde_json::json!({"ok": true})) });
        let mut ctx = test_ctx("");
        handler.handle(&mut ctx).await.unwrap();
        let bytes = ctx.response().body_bytes().unwrap();
        assert_eq!(bytes.as_ref(), br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn input_shape_binds_and_validates() {
        let handler = from_input(|input: CreateUser| async move {
            assert_eq!(input.name, "ada");
            Ok(())
        });
        let mut ctx = test_ctx(r#"{"name":"ada"}"#);
        handler.handle(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn input_shape_rejects_failed_validation() {
        let handler = from_input(|_input: CreateUser| async move { Ok(()) });
        let mut ctx = test_ctx(r#"{"name":""}"#);
        let err = handler.handle(&mut ctx).await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn input_shape_rejects_malformed_json() {
        let handler = from_input(|_input: CreateUser| async move { Ok(()) });
        let mut ctx = test_ctx("not json");
        let err = handler.handle(&mut ctx).await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn input_shape_rejects_empty_body_with_reason() {
        let handler = from_input(|_input: CreateUser| async move { Ok(()) });
        let mut ctx = test_ctx("");
        let err = handler.handle(&mut ctx).await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::BadRequest);
        assert_eq!(err.details().unwrap()["reason"], "empty_body");
    }

    #[tokio::test]
    async fn input_result_shape_writes_response() {
        let handler = from_input_result(|input: CreateUser| async move { Ok(serde_json::json!({"name": input.name})) });
        let mut ctx = test_ctx(r#"{"name":"grace"}"#);
        handler.handle(&mut ctx).await.unwrap();
        let bytes = ctx.response().body_bytes().unwrap();
        assert_eq!(bytes.as_ref(), br#"{"name":"grace"}"#);
    }

    #[tokio::test]
    async fn noop_shapes_ignore_context() {
        let handler = from_noop(|| async move { Ok(()) });
        let mut ctx = test_ctx("");
        handler.handle(&mut ctx).await.unwrap();

        let handler = from_noop_result(|| async move { Ok(serde_json::json!(42)) });
        let mut ctx = test_ctx("");
        handler.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().body_bytes().unwrap().as_ref(), b"42");
    }
}
