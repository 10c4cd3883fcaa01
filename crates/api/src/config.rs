use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
    /// Shared secret for the password transport obfuscation layer.
    pub transport_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Required | Default                 |
    /// |-----------------------------|----------|-------------------------|
    /// | `HOST`                      | no       | `0.0.0.0`               |
    /// | `PORT`                      | no       | `3000`                  |
    /// | `CORS_ORIGINS`              | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | no       | `30`                    |
    /// | `JWT_SECRET`                | **yes**  | --                      |
    /// | `PASSWORD_TRANSPORT_SECRET` | no       | `heartdays-dev-secret`  |
    ///
    /// # Panics
    ///
    /// Panics on missing `JWT_SECRET` or unparseable values; startup
    /// misconfiguration should fail fast.
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

        let transport_secret = std::env::var("PASSWORD_TRANSPORT_SECRET")
            .unwrap_or_else(|_| "heartdays-dev-secret".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            transport_secret,
        }
    }
}
