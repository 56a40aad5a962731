use std::time::Duration;

use seatwise_db::PoolConfig;

use crate::auth::jwt::JwtConfig;

/// Default bound on how long an enrollment waits for the training row lock.
const DEFAULT_ENROLL_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3100`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Connection pool sizing.
    pub db: PoolConfig,
    /// How long an enrollment may wait behind others on the same training.
    pub enroll_lock_timeout: Duration,
    /// JWT validation configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3100`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `DB_MAX_CONNECTIONS`      | `20`                    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                     |
    /// | `ENROLL_LOCK_TIMEOUT_MS`  | `5000`                  |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but cannot be parsed, or if `JWT_SECRET`
    /// is missing. Misconfiguration should stop the server at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3100);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30);

        let db = PoolConfig {
            max_connections: env_or("DB_MAX_CONNECTIONS", seatwise_db::DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: Duration::from_secs(env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                seatwise_db::DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
            )),
        };

        let enroll_lock_timeout =
            Duration::from_millis(env_or("ENROLL_LOCK_TIMEOUT_MS", DEFAULT_ENROLL_LOCK_TIMEOUT_MS));

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            db,
            enroll_lock_timeout,
            jwt,
        }
    }
}

/// Read and parse an environment variable, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
