//! The terminal unit of request processing (§4.2, §4.4).
//!
//! A [`Handler`] receives a fully-populated [`Context`] -- request routed,
//! path params bound, middleware already run -- and writes a [`Response`]
//! onto it, or fails with a [`LiftError`] that the recovery middleware turns
//! into one.
//!
//! # Static vs dynamic dispatch
//!
//! This trait uses native `async fn` for zero-cost static dispatch. The
//! [`Router`](crate::router::Router) and [`Middleware`](crate::middleware::Middleware)
//! chain store handlers as `Arc<dyn DynHandler>`, so [`DynHandler`] is the
//! object-safe bridge: every `Handler` gets a blanket `DynHandler`
//! implementation, and `Box<dyn DynHandler>` / `Arc<dyn DynHandler>`
//! implement `Handler` back, so the two can be used interchangeably.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::LiftError;

#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Handler`",
    label = "missing `Handler` implementation",
    note = "implement `handle` to process a `Context` and write a response"
)]
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context) -> impl Future<Output = Result<(), LiftError>> + Send;
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler: Send + Sync + 'static {
    fn handle_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>>;
}

impl<T: Handler> DynHandler for T {
    fn handle_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(self.handle(ctx))
    }
}

impl Handler for Box<dyn DynHandler> {
    async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
        self.handle_dyn(ctx).await
    }
}

impl Handler for Arc<dyn DynHandler> {
    async fn handle(&self, ctx: &mut Context) -> Result<(), LiftError> {
        self.handle_dyn(ctx).await
    }
}

/// Adapts a plain async closure into a [`Handler`], the way
/// `#[lift::handler]`-annotated functions get registered (§4.4).
pub struct HandlerFn<F>(pub F);

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(&mut Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LiftError>> + Send,
{
    fn handle(&self, ctx: &mut Context) -> impl Future<Output = Result<(), LiftError>> + Send {
        (self.0)(ctx)
    }
}
