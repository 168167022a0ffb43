//! The HTTP path router (§4.2).
//!
//! Registration composes each route's middleware chain once, up front, so
//! the hot path (`resolve`) is a lookup plus a segment comparison, never an
//! allocation-heavy re-composition.

mod group;
mod websocket;

pub use group::RouteGroup;
pub use websocket::WebSocketRouter;

use std::collections::HashMap;
use std::sync::Arc;

use lift_core::handler::Handler;
use lift_core::middleware::{compose, DynMiddleware};
use thiserror::Error;

/// Routing failures (§4.2), folded into a `LiftError` by the invocation driver.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no route matches {method} {path}")]
    NotFound { method: String, path: String },
    #[error("{path} matches a route but not for method {method}")]
    MethodNotAllowed { method: String, path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Splits a pattern or request path into its segments plus whether it ends
/// in a trailing slash. `/users/42` and `/users/42/` are distinct routes
/// (§4.2: no auto-normalization), so the trailing slash is carried alongside
/// the segment list rather than trimmed away.
fn split_path(path: &str) -> (Vec<&str>, bool) {
    let without_leading = path.trim_start_matches('/');
    let trailing_slash = !without_leading.is_empty() && without_leading.ends_with('/');
    let parts = without_leading
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    (parts, trailing_slash)
}

fn parse_pattern(pattern: &str) -> (Vec<Segment>, bool) {
    let (parts, trailing_slash) = split_path(pattern);
    let segments = parts
        .into_iter()
        .map(|s| {
            if let Some(name) = s.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(s.to_string())
            }
        })
        .collect();
    (segments, trailing_slash)
}

/// The canonical lookup key for a segment list: rejoins it with a single
/// leading slash and reattaches the trailing slash when present, so
/// `/users/42` and `/users/42/` hash to distinct keys.
fn canonical_key(parts: &[&str], trailing_slash: bool) -> String {
    let joined = parts.join("/");
    if trailing_slash && !parts.is_empty() {
        format!("/{joined}/")
    } else {
        format!("/{joined}")
    }
}

struct ParamRoute {
    segments: Vec<Segment>,
    trailing_slash: bool,
    handler: Arc<dyn Handler + Send + Sync>,
}

/// The registered-route table: an exact-match map for literal paths and a
/// per-method scan list for parameterized ones, per §4.2's two-table
/// algorithm.
#[derive(Default)]
pub struct PathRouter {
    exact: HashMap<(String, String), Arc<dyn Handler + Send + Sync>>,
    parameterized: HashMap<String, Vec<ParamRoute>>,
    known_paths: Vec<(String, Vec<Segment>, bool)>,
}

impl PathRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one route. `middlewares` is the already-flattened, ordered
    /// list for this route (parent group middlewares followed by any
    /// route-specific ones); composition happens here, at registration time.
    pub fn register(
        &mut self,
        method: impl Into<String>,
        pattern: impl Into<String>,
        middlewares: Vec<Arc<dyn DynMiddleware>>,
        terminal: Arc<dyn Handler + Send + Sync>,
    ) {
        let method = method.into().to_uppercase();
        let pattern = pattern.into();
        let composed = compose(middlewares, terminal);
        let (segments, trailing_slash) = parse_pattern(&pattern);

        if segments.iter().all(|s| matches!(s, Segment::Literal(_))) {
            let literal_parts: Vec<&str> = segments
                .iter()
                .map(|s| match s {
                    Segment::Literal(l) => l.as_str(),
                    Segment::Param(_) => unreachable!("all segments checked literal above"),
                })
                .collect();
            let key = canonical_key(&literal_parts, trailing_slash);
            self.exact.insert((method, key), composed);
        } else {
            self.known_paths.push((method.clone(), segments.clone(), trailing_slash));
            self.parameterized.entry(method).or_default().push(ParamRoute {
                segments,
                trailing_slash,
                handler: composed,
            });
        }
    }

    /// Resolves a method and path to a composed handler plus extracted path
    /// parameters, or a `RoutingError` per §4.2's `NOT_FOUND` /
    /// `METHOD_NOT_ALLOWED` distinction.
    pub fn resolve(
        &self,
        method: &str,
        path: &str,
    ) -> Result<(Arc<dyn Handler + Send + Sync>, HashMap<String, String>), RoutingError> {
        let method = method.to_uppercase();
        let (parts, trailing_slash) = split_path(path);

        if let Some(handler) = self.exact_lookup(&method, &parts, trailing_slash) {
            return Ok((handler, HashMap::new()));
        }

        if let Some(routes) = self.parameterized.get(&method) {
            for route in routes {
                if route.trailing_slash == trailing_slash {
                    if let Some(params) = match_segments(&route.segments, &parts) {
                        return Ok((route.handler.clone(), params));
                    }
                }
            }
        }

        if self.any_method_matches(&parts, trailing_slash) {
            Err(RoutingError::MethodNotAllowed {
                method,
                path: path.to_string(),
            })
        } else {
            Err(RoutingError::NotFound {
                method,
                path: path.to_string(),
            })
        }
    }

    fn exact_lookup(&self, method: &str, parts: &[&str], trailing_slash: bool) -> Option<Arc<dyn Handler + Send + Sync>> {
        let key = canonical_key(parts, trailing_slash);
        self.exact.get(&(method.to_string(), key)).cloned()
    }

    fn any_method_matches(&self, parts: &[&str], trailing_slash: bool) -> bool {
        let key = canonical_key(parts, trailing_slash);
        for ((_, p), _) in &self.exact {
            if *p == key {
                return true;
            }
        }
        for (_, segments, route_trailing_slash) in &self.known_paths {
            if *route_trailing_slash == trailing_slash && match_segments(segments, parts).is_some() {
                return true;
            }
        }
        false
    }
}

/// Literal segments compared exactly; `:name` segments capture a single
/// path element greedily (no wildcards, no cross-segment capture).
fn match_segments(pattern: &[Segment], parts: &[&str]) -> Option<HashMap<String, String>> {
    if pattern.len() != parts.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (seg, part) in pattern.iter().zip(parts.iter()) {
        match seg {
            Segment::Literal(lit) => {
                if lit != part {
                    return None;
                }
            }
            Segment::Param(name) => {
                params.insert(name.clone(), part.to_string());
            }
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_core::context::{CancellationToken, Context};
    use lift_core::handler::HandlerFn;
    use lift_core::request::Request;
    use lift_core::trigger::Trigger;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop_handler(tag: &'static str, calls: Arc<AtomicUsize>) -> Arc<dyn Handler + Send + Sync> {
        Arc::new(HandlerFn(move |ctx: &mut Context| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                ctx.response_mut()
                    .set_json_body(&serde_json::json!({"route": tag}))
                    .unwrap();
                Ok(())
            }
        }))
    }

    fn dummy_ctx(method: &str, path: &str) -> Context {
        Context::new(
            Request::new(
                Trigger::Http,
                method,
                path,
                http::HeaderMap::new(),
                HashMap::new(),
                bytes::Bytes::new(),
                HashMap::new(),
                serde_json::Value::Null,
            ),
            "req-1",
            CancellationToken::unbounded(),
            Arc::new(crate::collaborators::NoopLogger),
            Arc::new(crate::collaborators::NoopMetrics),
            Arc::new(crate::collaborators::NoopTracer),
        )
    }

    #[test]
    fn exact_route_resolves() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/health", vec![], noop_handler("health", calls));
        let (_, params) = router.resolve("GET", "/health").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn parameterized_route_captures_segment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/users/:id", vec![], noop_handler("user", calls));
        let (_, params) = router.resolve("GET", "/users/42").unwrap();
        assert_eq!(params.get("id").unwrap(), "42");
    }

    #[test]
    fn literal_routes_take_priority_over_parameterized() {
        let literal_calls = Arc::new(AtomicUsize::new(0));
        let param_calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/users/me", vec![], noop_handler("me", literal_calls.clone()));
        router.register("GET", "/users/:id", vec![], noop_handler("id", param_calls.clone()));
        let (handler, params) = router.resolve("GET", "/users/me").unwrap();
        assert!(params.is_empty());
        let mut ctx = dummy_ctx("GET", "/users/me");
        futures_lite_block_on(handler.handle(&mut ctx));
        assert_eq!(literal_calls.load(Ordering::SeqCst), 1);
        assert_eq!(param_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn trailing_slash_is_a_distinct_route() {
        let without_calls = Arc::new(AtomicUsize::new(0));
        let with_calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/users/42", vec![], noop_handler("without", without_calls.clone()));
        router.register("GET", "/users/42/", vec![], noop_handler("with", with_calls.clone()));

        let (handler, _) = router.resolve("GET", "/users/42").unwrap();
        let mut ctx = dummy_ctx("GET", "/users/42");
        futures_lite_block_on(handler.handle(&mut ctx));
        assert_eq!(without_calls.load(Ordering::SeqCst), 1);
        assert_eq!(with_calls.load(Ordering::SeqCst), 0);

        let (handler, _) = router.resolve("GET", "/users/42/").unwrap();
        let mut ctx = dummy_ctx("GET", "/users/42/");
        futures_lite_block_on(handler.handle(&mut ctx));
        assert_eq!(without_calls.load(Ordering::SeqCst), 1);
        assert_eq!(with_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn trailing_slash_on_request_without_matching_route_is_not_found() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/users/42", vec![], noop_handler("without", calls));
        let err = router.resolve("GET", "/users/42/").unwrap_err();
        assert!(matches!(err, RoutingError::NotFound { .. }));
    }

    #[test]
    fn unmatched_path_is_not_found() {
        let router = PathRouter::new();
        let err = router.resolve("GET", "/nope").unwrap_err();
        assert!(matches!(err, RoutingError::NotFound { .. }));
    }

    #[test]
    fn matched_path_wrong_method_is_method_not_allowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = PathRouter::new();
        router.register("GET", "/users/:id", vec![], noop_handler("user", calls));
        let err = router.resolve("POST", "/users/42").unwrap_err();
        assert!(matches!(err, RoutingError::MethodNotAllowed { .. }));
    }

    // minimal executor so this module doesn't need a tokio dev-dependency
    // just to drive one future to completion in a sync test.
    fn futures_lite_block_on<F: std::future::Future>(fut: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(fut)
    }
}
