//! CORS / security headers (§4.3 ordering position 5).

use std::future::Future;
use std::pin::Pin;

use http::header::{HeaderName, HeaderValue};
use lift_core::context::Context;
use lift_core::error::LiftError;
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

pub struct CorsConfig {
    pub allowed_origin: String,
    pub allowed_methods: String,
    pub allowed_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            allowed_methods: "GET, POST, PUT, PATCH, DELETE, OPTIONS".to_string(),
            allowed_headers: "content-type, authorization".to_string(),
        }
    }
}

pub struct CorsMiddleware {
    config: CorsConfig,
}

impl CorsMiddleware {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(CorsConfig::default())
    }
}

impl Middleware for CorsMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let result = next.handle(ctx).await;
            let response = ctx.response_mut();
            response.set_header(
                HeaderName::from_static("access-control-allow-origin"),
                HeaderValue::from_str(&self.config.allowed_origin).unwrap_or(HeaderValue::from_static("*")),
            );
            response.set_header(
                HeaderName::from_static("access-control-allow-methods"),
                HeaderValue::from_str(&self.config.allowed_methods).unwrap_or(HeaderValue::from_static("*")),
            );
            response.set_header(
                HeaderName::from_static("access-control-allow-headers"),
                HeaderValue::from_str(&self.config.allowed_headers).unwrap_or(HeaderValue::from_static("*")),
            );
            response.set_header(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            result
        })
    }
}
