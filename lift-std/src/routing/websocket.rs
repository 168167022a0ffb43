//! The WebSocket sub-router, keyed by `routeKey` rather than method+path
//! (§4.2 "WebSocket routing", §4.8).

use std::collections::HashMap;
use std::sync::Arc;

use lift_core::handler::Handler;
use lift_core::middleware::{compose, DynMiddleware};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no websocket route registered for routeKey {0:?}")]
    NotFound(String),
}

/// Well-known lifecycle route keys (§4.8).
pub const CONNECT: &str = "$connect";
pub const DISCONNECT: &str = "$disconnect";
pub const DEFAULT: &str = "$default";

#[derive(Default)]
pub struct WebSocketRouter {
    routes: HashMap<String, Arc<dyn Handler + Send + Sync>>,
}

impl WebSocketRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one message route. `middlewares` is the already-flattened,
    /// ordered list for this route; composition happens here, at
    /// registration time, the same as [`super::PathRouter::register`] --
    /// a panicking handler on any route key must still come back through
    /// recovery middleware, not unwind past the driver.
    pub fn on(&mut self, route_key: impl Into<String>, middlewares: Vec<Arc<dyn DynMiddleware>>, handler: Arc<dyn Handler + Send + Sync>) {
        self.routes.insert(route_key.into(), compose(middlewares, handler));
    }

    pub fn on_connect(&mut self, middlewares: Vec<Arc<dyn DynMiddleware>>, handler: Arc<dyn Handler + Send + Sync>) {
        self.on(CONNECT, middlewares, handler);
    }

    pub fn on_disconnect(&mut self, middlewares: Vec<Arc<dyn DynMiddleware>>, handler: Arc<dyn Handler + Send + Sync>) {
        self.on(DISCONNECT, middlewares, handler);
    }

    /// Resolves a message route, falling back to `$default` if no route is
    /// registered for the exact `routeKey`.
    pub fn resolve(&self, route_key: &str) -> Result<Arc<dyn Handler + Send + Sync>, RoutingError> {
        self.routes
            .get(route_key)
            .or_else(|| self.routes.get(DEFAULT))
            .cloned()
            .ok_or_else(|| RoutingError::NotFound(route_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::context::Context;
    use lift_core::handler::HandlerFn;

    fn terminal() -> Arc<dyn Handler + Send + Sync> {
        Arc::new(HandlerFn(|_ctx: &mut Context| async { Ok(()) }))
    }

    #[test]
    fn falls_back_to_default_route() {
        let mut router = WebSocketRouter::new();
        router.on(DEFAULT, vec![], terminal());
        assert!(router.resolve("chat.message").is_ok());
    }

    #[test]
    fn exact_route_preferred_over_default() {
        let mut router = WebSocketRouter::new();
        router.on(DEFAULT, vec![], terminal());
        router.on("chat.message", vec![], terminal());
        assert!(router.resolve("chat.message").is_ok());
    }

    #[test]
    fn missing_route_without_default_is_not_found() {
        let router = WebSocketRouter::new();
        assert!(router.resolve("chat.message").is_err());
    }
}
