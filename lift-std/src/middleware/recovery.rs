//! Panic-catching recovery (§4.3 ordering position 3, §4.6).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures::FutureExt;
use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

/// Wraps everything below it so that exactly one layer ever converts a
/// panic into a `PANIC_RECOVERED` error (§4.3); without this middleware a
/// panicking handler would unwind straight through the Lambda runtime.
pub struct RecoveryMiddleware;

impl Middleware for RecoveryMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            match AssertUnwindSafe(next.handle(ctx)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(&panic);
                    Err(LiftError::new(ErrorCode::PanicRecovered, "handler panicked")
                        .with_details(serde_json::json!({"stack": message}))
                        .with_status(500))
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn catches_panic_and_converts_to_panic_recovered() {
        let handler = HandlerFn(|_ctx: &mut Context| async {
            panic!("boom");
            #[allow(unreachable_code)]
            Ok(())
        });
        let recovery = RecoveryMiddleware;
        let mut ctx = test_ctx();
        let err = recovery.process(&mut ctx, &handler).await.unwrap_err();
        assert_eq!(*err.code(), ErrorCode::PanicRecovered);
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn passes_through_normal_success() {
        let handler = HandlerFn(|ctx: &mut Context| async {
            ctx.response_mut().set_status(204);
            Ok(())
        });
        let recovery = RecoveryMiddleware;
        let mut ctx = test_ctx();
        recovery.process(&mut ctx, &handler).await.unwrap();
        assert_eq!(ctx.response().status_code(), 204);
    }
}
