//! The structured error taxonomy.
//!
//! Everything that crosses a handler/middleware boundary is either a
//! [`LiftError`] already, or gets wrapped into one as `INTERNAL_ERROR` at the
//! point where it is first observed by the pipeline. [`LiftError`] is the
//! single shape the outermost recovery middleware ever has to project into a
//! response.

use std::fmt;

use serde_json::Value;

/// A boxed error type for dynamic error handling, mirroring the rest of this
/// lineage's `BoxError` convention.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable error codes.
///
/// This is deliberately not exhaustive-matched anywhere in the pipeline:
/// collaborators are free to introduce their own codes via
/// [`ErrorCode::Custom`], which is why [`LiftError`] stores `code` as data
/// rather than branching on a closed enum internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    ValidationFailed,
    PayloadTooLarge,
    RateLimited,
    InternalError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    Cancelled,
    PanicRecovered,
    UnsupportedEvent,
    CircuitOpen,
    Custom(String),
}

impl ErrorCode {
    /// The default HTTP status projection for this code.
    pub fn default_status(&self) -> u16 {
        match self {
            ErrorCode::BadRequest => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::Conflict => 409,
            ErrorCode::ValidationFailed => 422,
            ErrorCode::PayloadTooLarge => 413,
            ErrorCode::RateLimited => 429,
            ErrorCode::InternalError => 500,
            ErrorCode::BadGateway => 502,
            ErrorCode::ServiceUnavailable => 503,
            ErrorCode::GatewayTimeout => 504,
            ErrorCode::Cancelled => 499,
            ErrorCode::PanicRecovered => 500,
            ErrorCode::UnsupportedEvent => 500,
            ErrorCode::CircuitOpen => 503,
            ErrorCode::Custom(_) => 500,
        }
    }

    /// The machine-readable string this code serializes as.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::BadGateway => "BAD_GATEWAY",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::GatewayTimeout => "GATEWAY_TIMEOUT",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::PanicRecovered => "PANIC_RECOVERED",
            ErrorCode::UnsupportedEvent => "UNSUPPORTED_EVENT",
            ErrorCode::CircuitOpen => "CIRCUIT_OPEN",
            ErrorCode::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single universal error shape for the pipeline.
///
/// `LiftError` is a plain struct rather than a `thiserror` enum: its
/// `code`/`statusCode`/`details` triple is data the host and collaborators
/// extend at runtime (§7 requires new codes without a new Rust type), not a
/// fixed set of variants to exhaustively match.
#[derive(Debug, Clone)]
pub struct LiftError {
    code: ErrorCode,
    message: String,
    status_code: u16,
    details: Option<Value>,
    cause: Option<String>,
    request_id: Option<String>,
    timestamp: Option<String>,
}

impl LiftError {
    /// Build a new error from a code and message, defaulting `statusCode` to
    /// the code's canonical HTTP projection.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let status_code = code.default_status();
        Self {
            code,
            message: message.into(),
            status_code,
            details: None,
            cause: None,
            request_id: None,
            timestamp: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn is_retryable_by_default(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ServiceUnavailable | ErrorCode::GatewayTimeout | ErrorCode::BadGateway
        )
    }

    /// Project the error into the wire body described in §6 /
    /// `{error: {code, message, details, request_id, timestamp}}`.
    ///
    /// `redact` only ever scrubs `details`/`cause` from a 5xx body (production
    /// mode); a 4xx body always carries `details` regardless of `redact`,
    /// since the client needs them to correct the request. The full error is
    /// still available via the accessors above for logging either way.
    pub fn to_body(&self, redact: bool) -> Value {
        let mut error = serde_json::json!({
            "code": self.code.as_str(),
            "message": self.message,
        });
        let obj = error.as_object_mut().expect("object literal");
        if let Some(request_id) = &self.request_id {
            obj.insert("request_id".into(), Value::String(request_id.clone()));
        }
        if let Some(timestamp) = &self.timestamp {
            obj.insert("timestamp".into(), Value::String(timestamp.clone()));
        }
        let redact = redact && !self.client_visible();
        if !redact {
            if let Some(details) = &self.details {
                obj.insert("details".into(), details.clone());
            }
        }
        serde_json::json!({ "error": error })
    }

    pub(crate) fn client_visible(&self) -> bool {
        self.status_code < 500
    }
}

impl fmt::Display for LiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LiftError {}

/// Wraps an opaque error into `INTERNAL_ERROR`, preserving the original as
/// `cause` (§7 classification rule).
impl From<BoxError> for LiftError {
    fn from(err: BoxError) -> Self {
        LiftError::new(ErrorCode::InternalError, "internal error").with_cause(err)
    }
}
