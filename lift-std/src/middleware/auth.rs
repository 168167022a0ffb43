//! Authentication (§4.3 ordering position 6) and authorization (position 7).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lift_core::collaborators::AuthValidator;
use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;

/// A cookie carrying a JWT larger than this is rejected as `UNAUTHORIZED`
/// without ever being handed to a parser -- an oversized cookie is always a
/// malformed or hostile one, never a legitimate token.
const MAX_JWT_COOKIE_BYTES: usize = 8 * 1024;

/// The name of the cookie `AuthMiddleware` falls back to when no `Bearer`
/// token is present in `Authorization` (e.g. a browser `WebSocket` client,
/// which cannot set custom headers on the handshake).
const JWT_COOKIE_NAME: &str = "jwt";

/// Extracts the first `name=value` pair matching `name` out of a raw
/// `Cookie` header value (`"a=1; b=2"`), without attempting to decode or
/// validate it.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Extracts a bearer token from `Authorization`, falling back to a `jwt`
/// cookie, and hands it to an [`AuthValidator`] collaborator, populating
/// `Context::principal` on success. Missing or invalid credentials fail
/// with `UNAUTHORIZED`; a `jwt` cookie over [`MAX_JWT_COOKIE_BYTES`] is
/// rejected the same way without ever being parsed.
pub struct AuthMiddleware {
    validator: Arc<dyn AuthValidator>,
    config: serde_json::Value,
}

impl AuthMiddleware {
    pub fn new(validator: Arc<dyn AuthValidator>) -> Self {
        Self {
            validator,
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

impl Middleware for AuthMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let bearer = ctx
                .request()
                .header("authorization")
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string);

            let token = match bearer {
                Some(token) => token,
                None => {
                    let cookie = ctx.request().header("cookie").and_then(|h| cookie_value(h, JWT_COOKIE_NAME));
                    match cookie {
                        Some(jwt) if jwt.len() > MAX_JWT_COOKIE_BYTES => {
                            return Err(LiftError::new(ErrorCode::Unauthorized, "jwt cookie exceeds maximum size"));
                        }
                        Some(jwt) => jwt.to_string(),
                        None => return Err(LiftError::new(ErrorCode::Unauthorized, "missing bearer token")),
                    }
                }
            };

            let principal = self.validator.validate(&token, &self.config).await?;
            ctx.set_principal(principal);
            next.handle(ctx).await
        })
    }
}

/// Consumes the identity [`AuthMiddleware`] populated, rejecting requests
/// whose principal lacks any of `required_roles`.
pub struct AuthzMiddleware {
    required_roles: Vec<String>,
}

impl AuthzMiddleware {
    pub fn new(required_roles: Vec<String>) -> Self {
        Self { required_roles }
    }
}

impl Middleware for AuthzMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let Some(principal) = ctx.principal() else {
                return Err(LiftError::new(ErrorCode::Forbidden, "no authenticated principal"));
            };
            let has_all = self
                .required_roles
                .iter()
                .all(|role| principal.roles.iter().any(|r| r == role));
            if !has_all {
                return Err(LiftError::new(ErrorCode::Forbidden, "missing required role"));
            }
            next.handle(ctx).await
        })
    }
}
