//! Rate limiting (§4.3 ordering position 8).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lift_core::collaborators::RateLimitStore;
use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

/// Keys the rate limit bucket by the authenticated user id when available,
/// falling back to a constant key (effectively a single global bucket) --
/// a host can swap in any other key strategy by constructing with
/// [`RateLimitMiddleware::with_key_fn`].
pub struct RateLimitMiddleware {
    store: Arc<dyn RateLimitStore>,
    limit: u64,
    window_secs: u64,
    key_fn: Box<dyn Fn(&Context) -> String + Send + Sync>,
}

impl RateLimitMiddleware {
    pub fn new(store: Arc<dyn RateLimitStore>, limit: u64, window_secs: u64) -> Self {
        Self {
            store,
            limit,
            window_secs,
            key_fn: Box::new(|ctx| ctx.user_id().unwrap_or("anonymous").to_string()),
        }
    }

    pub fn with_key_fn(mut self, key_fn: impl Fn(&Context) -> String + Send + Sync + 'static) -> Self {
        self.key_fn = Box::new(key_fn);
        self
    }
}

impl Middleware for RateLimitMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let key = (self.key_fn)(ctx);
            let decision = self.store.try_consume(&key, self.limit, self.window_secs).await;
            if !decision.allowed {
                return Err(LiftError::new(ErrorCode::RateLimited, "rate limit exceeded").with_details(
                    serde_json::json!({"reset_at_epoch_secs": decision.reset_at_epoch_secs}),
                ));
            }
            next.handle(ctx).await
        })
    }
}
