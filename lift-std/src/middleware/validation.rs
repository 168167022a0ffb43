//! Request validation (§4.3 ordering position 9, §4.5).
//!
//! This runs ahead of the handler for validators that operate on the raw
//! request (e.g. required headers/query params) rather than on the bound
//! `Input` value, which the Handler Adapter validates itself once decoded
//! (§4.4).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lift_core::context::Context;
use lift_core::error::{ErrorCode, LiftError};
use lift_core::handler::Handler;
use lift_core::middleware::Middleware;
use lift_core::validation::{errors_to_json, ValueValidator};

pub struct ValidationMiddleware {
    validator: Arc<dyn ValueValidator>,
}

impl ValidationMiddleware {
    pub fn new(validator: Arc<dyn ValueValidator>) -> Self {
        Self { validator }
    }
}

impl Middleware for ValidationMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut Context,
        next: &'a (dyn Handler + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<(), LiftError>> + Send + 'a>> {
        Box::pin(async move {
            let errors = self.validator.validate_value(ctx.request().raw());
            if !errors.is_empty() {
                return Err(LiftError::new(ErrorCode::ValidationFailed, "request validation failed")
                    .with_details(serde_json::json!({"errors": errors_to_json(&errors)})));
            }
            next.handle(ctx).await
        })
    }
}
