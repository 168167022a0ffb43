//! Route groups (§4.2 "Group composition").

use std::sync::Arc;

use lift_core::handler::Handler;
use lift_core::middleware::DynMiddleware;

use super::PathRouter;

/// A prefix plus an ordered middleware list, snapshotted onto every route
/// registered through it. Nesting groups concatenates prefixes and
/// middleware lists; composition itself still happens once, at the moment
/// a concrete route is registered against the underlying [`PathRouter`].
pub struct RouteGroup<'a> {
    router: &'a mut PathRouter,
    prefix: String,
    middlewares: Vec<Arc<dyn DynMiddleware>>,
}

impl<'a> RouteGroup<'a> {
    pub fn new(router: &'a mut PathRouter) -> Self {
        Self {
            router,
            prefix: String::new(),
            middlewares: Vec::new(),
        }
    }

    /// Creates a child group nested under `prefix`, inheriting this group's
    /// middlewares and appending `extra` (§4.2: `parent_group_middlewares ++
    /// extra`, snapshot at registration).
    pub fn nest<'b>(
        &'b mut self,
        prefix: &str,
        extra: Vec<Arc<dyn DynMiddleware>>,
    ) -> RouteGroup<'b> {
        let mut middlewares = self.middlewares.clone();
        middlewares.extend(extra);
        RouteGroup {
            router: self.router,
            prefix: format!("{}/{}", self.prefix.trim_end_matches('/'), prefix.trim_start_matches('/')),
            middlewares,
        }
    }

    pub fn route(
        &mut self,
        method: impl Into<String>,
        pattern: impl Into<String>,
        extra: Vec<Arc<dyn DynMiddleware>>,
        terminal: Arc<dyn Handler + Send + Sync>,
    ) {
        let pattern = pattern.into();
        let full_path = format!("{}/{}", self.prefix.trim_end_matches('/'), pattern.trim_start_matches('/'));
        let mut middlewares = self.middlewares.clone();
        middlewares.extend(extra);
        self.router.register(method, full_path, middlewares, terminal);
    }
}
