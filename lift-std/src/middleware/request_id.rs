//! Request-ID assignment (§4.3 ordering position 1).

use std::future::Future;
use std::pin::Pin;

use http::header::{HeaderName, HeaderValue};
use lift_core::context::Context;
use lift_core::error::LiftError;
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

const HEADER: &str = "x-request-id";

/// Binds the context's request id into the request-scoped logger and
/// echoes it back on the response, so every downstream log line and the
/// caller both carry it. The id itself was already assigned by the
/// Invocation Driver when the `Context` was constructed (§4.7 step 2); this
/// middleware only needs to be first so nothing downstream logs without it.
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let request_id = ctx.request_id().to_string();
            let logger = ctx.logger().with(serde_json::json!({"request_id": request_id}));
            ctx.set_logger(std::sync::Arc::from(logger));

            let result = next.handle(ctx).await;

            if let Ok(value) = HeaderValue::from_str(ctx.request_id()) {
                ctx.response_mut()
                    .set_header(HeaderName::from_static(HEADER), value);
            }
            result
        })
    }
}
