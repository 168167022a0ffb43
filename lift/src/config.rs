//! Host-supplied runtime configuration (§10.4). Deliberately a plain struct
//! with a fluent builder -- no environment-scanning crate; reading
//! `LIFT_ENVIRONMENT` and friends is left to the handful of lines of
//! `std::env::var` calls in the host binary's `main`.

use std::time::Duration;

/// Deployment environment, used to select the `tracing-subscriber`
/// formatter (§10.2) and whether error responses redact `details`/`cause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// 5xx responses redact `details`/`cause` from the client body outside
    /// of development (§4.6).
    pub fn redacts_errors(&self) -> bool {
        !matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone)]
pub struct LiftConfig {
    environment: Environment,
    max_request_bytes: usize,
    max_response_bytes: usize,
    default_timeout: Duration,
    panic_recovery: bool,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            max_request_bytes: 6 * 1024 * 1024,
            max_response_bytes: 6 * 1024 * 1024,
            default_timeout: Duration::from_secs(29),
            panic_recovery: true,
        }
    }
}

impl LiftConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn max_request_bytes(mut self, bytes: usize) -> Self {
        self.max_request_bytes = bytes;
        self
    }

    pub fn max_response_bytes(mut self, bytes: usize) -> Self {
        self.max_response_bytes = bytes;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn panic_recovery(mut self, enabled: bool) -> Self {
        self.panic_recovery = enabled;
        self
    }

    pub fn get_environment(&self) -> Environment {
        self.environment
    }

    pub fn get_max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    pub fn get_max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    pub fn get_default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn get_panic_recovery(&self) -> bool {
        self.panic_recovery
    }
}
