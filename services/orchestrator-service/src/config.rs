//! Environment-driven configuration, loaded once at process start.

use std::time::Duration;

const DEFAULT_PORT: u16 = 8084;
const DEFAULT_ORDER_SERVICE_URL: &str = "http://127.0.0.1:8081";
const DEFAULT_INVENTORY_SERVICE_URL: &str = "http://127.0.0.1:8082";
const DEFAULT_PAYMENT_SERVICE_URL: &str = "http://127.0.0.1:8083";
const DEFAULT_SAGA_DEADLINE_SECONDS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_SERVICE_CALL_TIMEOUT_SECONDS: u64 = 10;

/// Runtime configuration for the orchestrator service binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Base URL of the order service.
    pub order_service_url: String,
    /// Base URL of the inventory service.
    pub inventory_service_url: String,
    /// Base URL of the payment service.
    pub payment_service_url: String,
    /// How long a whole saga run may take before it's reported as failed.
    pub saga_deadline: Duration,
    /// Max attempts the downstream HTTP client retries a single step call.
    pub max_attempts: u32,
    /// Per-call timeout applied to each downstream HTTP request.
    pub service_call_timeout: Duration,
}

impl Config {
    /// Loads configuration from the environment, falling back to documented
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let port = std::env::var("ORCHESTRATOR_SERVICE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let order_service_url =
            std::env::var("ORDER_SERVICE_URL").unwrap_or_else(|_| DEFAULT_ORDER_SERVICE_URL.to_string());
        let inventory_service_url = std::env::var("INVENTORY_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_INVENTORY_SERVICE_URL.to_string());
        let payment_service_url =
            std::env::var("PAYMENT_SERVICE_URL").unwrap_or_else(|_| DEFAULT_PAYMENT_SERVICE_URL.to_string());
        let saga_deadline_secs = std::env::var("SAGA_DEADLINE_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SAGA_DEADLINE_SECONDS);
        let max_attempts = std::env::var("SAGA_STEP_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let service_call_timeout_secs = std::env::var("SERVICE_CALL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SERVICE_CALL_TIMEOUT_SECONDS);

        Self {
            port,
            order_service_url,
            inventory_service_url,
            payment_service_url,
            saga_deadline: Duration::from_secs(saga_deadline_secs),
            max_attempts,
            service_call_timeout: Duration::from_secs(service_call_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_vars_fall_back_to_documented_defaults() {
        std::env::remove_var("ORCHESTRATOR_SERVICE_PORT");
        std::env::remove_var("ORDER_SERVICE_URL");
        std::env::remove_var("INVENTORY_SERVICE_URL");
        std::env::remove_var("PAYMENT_SERVICE_URL");
        std::env::remove_var("SAGA_DEADLINE_SECONDS");
        std::env::remove_var("SAGA_STEP_MAX_ATTEMPTS");
        std::env::remove_var("SERVICE_CALL_TIMEOUT_SECONDS");

        let config = Config::from_env();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.order_service_url, DEFAULT_ORDER_SERVICE_URL);
        assert_eq!(config.saga_deadline, Duration::from_secs(DEFAULT_SAGA_DEADLINE_SECONDS));
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.service_call_timeout, Duration::from_secs(DEFAULT_SERVICE_CALL_TIMEOUT_SECONDS));
    }
}
