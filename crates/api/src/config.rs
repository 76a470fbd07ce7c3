use std::str::FromStr;

use axum::http::HeaderValue;
use fetchboard_core::transform::TransformLimits;

use crate::auth::session::SessionConfig;

/// Invalid or missing configuration. Aborts startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// How requests are mapped to an [`Identity`](fetchboard_core::identity::Identity).
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Every request runs as the same fixed user.
    Placeholder { user_id: String },
    /// Requests must carry a signed session token.
    Session(SessionConfig),
}

/// Log output format for the binary's subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the session secret have defaults suitable for local
/// development.
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
    /// Outbound request timeout for the executor (default: `30`).
    pub execute_timeout_secs: u64,
    pub auth: AuthConfig,
    /// Where `GET /api/auth/github` redirects to, if anywhere.
    pub auth_login_url: Option<String>,
    pub transform_limits: TransformLimits,
    pub log_format: LogFormat,
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
    /// | `EXECUTE_TIMEOUT_SECS` | `30`                       |
    /// | `AUTH_MODE`            | `placeholder`              |
    /// | `PLACEHOLDER_USER_ID`  | `local`                    |
    /// | `SESSION_SECRET`       | required in `session` mode |
    /// | `SESSION_TTL_HOURS`    | `168`                      |
    /// | `AUTH_LOGIN_URL`       | unset                      |
    /// | `TRANSFORM_MAX_STEPS`  | `1000000`                  |
    /// | `LOG_FORMAT`           | `text`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.string("HOST", "0.0.0.0");
        let port: u16 = env.parse("PORT", 3000)?;

        let cors_origins: Vec<String> = env
            .string("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: bad.clone(),
                reason: "not a valid header value".into(),
            });
        }

        let request_timeout_secs: u64 = env.parse("REQUEST_TIMEOUT_SECS", 30)?;
        let execute_timeout_secs: u64 = env.parse("EXECUTE_TIMEOUT_SECS", 30)?;

        let auth = match env.string("AUTH_MODE", "placeholder").as_str() {
            "placeholder" => AuthConfig::Placeholder {
                user_id: env.string("PLACEHOLDER_USER_ID", "local"),
            },
            "session" => {
                let secret = env
                    .get("SESSION_SECRET")
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::Missing {
                        var: "SESSION_SECRET",
                    })?;
                let ttl_hours: i64 = env.parse("SESSION_TTL_HOURS", 168)?;
                if ttl_hours <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "SESSION_TTL_HOURS",
                        value: ttl_hours.to_string(),
                        reason: "must be positive".into(),
                    });
                }
                AuthConfig::Session(SessionConfig { secret, ttl_hours })
            }
            other => {
                return Err(ConfigError::Invalid {
                    var: "AUTH_MODE",
                    value: other.to_string(),
                    reason: "expected 'placeholder' or 'session'".into(),
                })
            }
        };

        let auth_login_url = env.get("AUTH_LOGIN_URL").filter(|s| !s.trim().is_empty());

        let transform_limits = TransformLimits {
            max_steps: env.parse("TRANSFORM_MAX_STEPS", TransformLimits::default().max_steps)?,
            ..TransformLimits::default()
        };

        let log_format = match env.string("LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'text' or 'json'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            execute_timeout_secs,
            auth,
            auth_login_url,
            transform_limits,
            log_format,
        })
    }
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
    }

    fn string(&self, var: &str, default: &str) -> String {
        self.get(var).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(var) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
