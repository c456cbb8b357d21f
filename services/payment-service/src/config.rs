//! Environment-driven configuration, loaded once at process start.

use std::time::Duration;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_PUBLISH_TIMEOUT_SECONDS: u64 = 5;

/// Runtime configuration for the payment service binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// AMQP broker URL for the `saga_events` topic exchange.
    pub rabbitmq_url: String,
    /// Deadline for a single event-bus publish.
    pub publish_timeout: Duration,
}

impl Config {
    /// Loads configuration from the environment, falling back to documented
    /// defaults for anything unset or unparsable.
    ///
    /// The gateway's own `PAYMENT_GATEWAY_LIMIT` / `PAYMENT_GATEWAY_FAILURE_RATE`
    /// variables are read directly by `PaymentGateway::from_env` rather than
    /// threaded through here.
    #[must_use]
    pub fn from_env() -> Self {
        let port = std::env::var("PAYMENT_SERVICE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let rabbitmq_url = std::env::var("RABBITMQ_URL")
            .unwrap_or_else(|_| "amqp://127.0.0.1:5672/%2f".to_string());
        let publish_timeout_secs = std::env::var("RABBITMQ_PUBLISH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT_SECONDS);

        Self { port, rabbitmq_url, publish_timeout: Duration::from_secs(publish_timeout_secs) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_vars_fall_back_to_documented_defaults() {
        std::env::remove_var("PAYMENT_SERVICE_PORT");
        std::env::remove_var("RABBITMQ_URL");
        std::env::remove_var("RABBITMQ_PUBLISH_TIMEOUT_SECONDS");

        let config = Config::from_env();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.publish_timeout, Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECONDS));
    }
}
