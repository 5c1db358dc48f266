use velo_core::rental::DEFAULT_RESERVATION_HOLD_MINS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Shared bearer secret expected from the telemetry webhook.
    pub webhook_token: String,
    /// Reservation hold duration in minutes (default: `10`).
    pub reservation_hold_mins: i64,
    /// Interval of the reservation expiry sweep in seconds (default: `60`).
    pub reservation_sweep_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Required | Default                 |
    /// |--------------------------|----------|-------------------------|
    /// | `HOST`                   | no       | `0.0.0.0`               |
    /// | `PORT`                   | no       | `3000`                  |
    /// | `CORS_ORIGINS`           | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | no       | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | no       | `30`                    |
    /// | `JWT_SECRET`             | **yes**  | --                      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `15`                    |
    /// | `WEBHOOK_TOKEN`          | **yes**  | --                      |
    /// | `RESERVATION_HOLD_MINS`  | no       | `10`                    |
    /// | `RESERVATION_SWEEP_SECS` | no       | `60`                    |
    ///
    /// # Panics
    ///
    /// Panics when a required variable is missing or a value fails to
    /// parse -- misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let webhook_token =
            std::env::var("WEBHOOK_TOKEN").expect("WEBHOOK_TOKEN must be set in the environment");
        assert!(!webhook_token.is_empty(), "WEBHOOK_TOKEN must not be empty");

        let reservation_hold_mins: i64 = std::env::var("RESERVATION_HOLD_MINS")
            .unwrap_or_else(|_| DEFAULT_RESERVATION_HOLD_MINS.to_string())
            .parse()
            .expect("RESERVATION_HOLD_MINS must be a valid i64");

        let reservation_sweep_secs: u64 = std::env::var("RESERVATION_SWEEP_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RESERVATION_SWEEP_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            webhook_token,
            reservation_hold_mins,
            reservation_sweep_secs,
        }
    }
}
