//! Leaf error types folded into [`lift_core::error::LiftError`] at their
//! point of origin (§10.3, §10.6).

use lift_core::error::{ErrorCode, LiftError};
use thiserror::Error;

/// Event Adapter Registry failures (§4.1).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no registered adapter recognizes this event shape")]
    Unrecognized,
    #[error("event matched the {trigger} adapter but failed to deserialize: {source}")]
    Deserialize {
        trigger: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AdapterError> for LiftError {
    fn from(err: AdapterError) -> Self {
        LiftError::new(ErrorCode::UnsupportedEvent, "unsupported event").with_cause(err)
    }
}

/// Handler Adapter input-binding failures (§4.4).
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("request body was empty")]
    EmptyBody,
    #[error("failed to decode request body as JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("field {field} failed binding: {message}")]
    Field { field: String, message: String },
}

impl From<BindingError> for LiftError {
    fn from(err: BindingError) -> Self {
        let details = match &err {
            BindingError::EmptyBody => Some(serde_json::json!({"reason": "empty_body"})),
            BindingError::Field { field, .. } => Some(serde_json::json!({"field": field})),
            BindingError::InvalidJson(_) => None,
        };
        let mut lift_err = LiftError::new(ErrorCode::BadRequest, err.to_string());
        if let Some(details) = details {
            lift_err = lift_err.with_details(details);
        }
        lift_err
    }
}
