use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have sensible defaults suitable for
/// local development. In production, override via environment variables.
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
    /// JWT token configuration (secret, signature expiry).
    pub jwt: JwtConfig,
    /// Session-row lifetime in days (default: `7`).
    ///
    /// Intentionally longer than the token's signature expiry: the row is
    /// the revocation point, the signature only bounds replay of a token
    /// whose row was never created.
    pub session_expiry_days: i64,
    /// Failed sign-in attempts within the window before lockout (default: `5`).
    pub login_max_failures: i64,
    /// Trailing window for counting failed sign-ins, minutes (default: `15`).
    pub login_window_mins: i64,
    /// How long past `ends_at` a lapsed subscription may still be renewed,
    /// and how close to expiry an active one becomes renewable (default: `7`).
    pub renewal_grace_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SESSION_EXPIRY_DAYS`  | `7`                        |
    /// | `LOGIN_MAX_FAILURES`   | `5`                        |
    /// | `LOGIN_WINDOW_MINS`    | `15`                       |
    /// | `RENEWAL_GRACE_DAYS`   | `7`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_expiry_days: i64 = env_i64("SESSION_EXPIRY_DAYS", 7);
        let login_max_failures: i64 = env_i64("LOGIN_MAX_FAILURES", 5);
        let login_window_mins: i64 = env_i64("LOGIN_WINDOW_MINS", 15);
        let renewal_grace_days: i64 = env_i64("RENEWAL_GRACE_DAYS", 7);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            session_expiry_days,
            login_max_failures,
            login_window_mins,
            renewal_grace_days,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid i64"))
}
