//! Static or computed substitute response on failure (§4.6).

use std::future::Future;
use std::pin::Pin;

use lift_core::context::Context;
use lift_core::error::LiftError;
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

/// Runs `next`; on failure, calls `substitute` to produce a replacement
/// response instead of propagating the error. `substitute` may itself
/// return an error, e.g. to only handle a subset of failure codes and
/// re-raise the rest.
pub struct Fallback<F> {
    substitute: F,
}

impl<F> Fallback<F>
where
    F: Fn(&mut Context, LiftError) -> Result<(), LiftError> + Send + Sync + 'static,
{
    pub fn new(substitute: F) -> Self {
        Self { substitute }
    }
}

impl<F> Middleware for Fallback<F>
where
    F: Fn(&mut Context, LiftError) -> Result<(), LiftError> + Send + Sync + 'static,
{
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            match next.handle(ctx).await {
                Ok(()) => Ok(()),
                Err(err) => (self.substitute)(ctx, err),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::error::ErrorCode;
    use lift_core::handler::HandlerFn;
    use std::sync::Arc;

    fn test_ctx() -> Context {
        Context::new(
            lift_core::request::Request::new(
                lift_core::trigger::Trigger::Http,
                "GET",
                "/",
                http::HeaderMap::new(),
                std::collections::HashMap::new(),
                bytes::Bytes::new(),
                std::collections::HashMap::new(),
                serde_json::Value::Null,
            ),
            "req-1",
            lift_core::context::CancellationToken::unbounded(),
            Arc::new(crate::collaborators::NoopLogger),
            Arc::new(crate::collaborators::NoopMetrics),
            Arc::new(crate::collaborators::NoopTracer),
        )
    }

    #[tokio::test]
    async fn substitutes_a_response_on_failure() {
        let handler = HandlerFn(|_ctx: &mut Context| async {
            Err(LiftError::new(ErrorCode::ServiceUnavailable, "down"))
        });
        let fallback = Fallback::new(|ctx: &mut Context, _err| {
            ctx.response_mut()
                .set_json_body(&serde_json::json!({"cached": true}))
                .unwrap();
            Ok(())
        });
        let mut ctx = test_ctx();
        fallback.process(&mut ctx, &handler).await.unwrap();
        assert_eq!(ctx.response().status_code(), 200);
    }

    #[tokio::test]
    async fn success_path_is_untouched() {
        let handler = HandlerFn(|ctx: &mut Context| async {
            ctx.response_mut().set_status(201);
            Ok(())
        });
        let fallback = Fallback::new(|ctx: &mut Context, err| {
            ctx.response_mut().set_status(500);
            Err(err)
        });
        let mut ctx = test_ctx();
        fallback.process(&mut ctx, &handler).await.unwrap();
        assert_eq!(ctx.response().status_code(), 201);
    }
}
