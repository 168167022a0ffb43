//! The validation hook (§4.5).

use serde_json::Value;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// The contract the Handler Adapter invokes once it has bound a request
/// body into an `Input` value (§4.4, §4.5). The core defines this contract;
/// concrete rule languages (tag strings, JSON Schema, ...) are supplied by
/// a collaborator, not implemented here.
pub trait Validate {
    fn validate(&self) -> Vec<FieldError>;
}

/// Runs [`Validate::validate`] against a decoded JSON value, for callers
/// that validate ahead of (or instead of) deserializing into a concrete
/// `Input` type.
pub trait ValueValidator: Send + Sync {
    fn validate_value(&self, value: &Value) -> Vec<FieldError>;
}

pub fn errors_to_json(errors: &[FieldError]) -> Value {
    Value::Array(
        errors
            .iter()
            .map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "rule": e.rule,
                    "message": e.message,
                })
            })
            .collect(),
    )
}
