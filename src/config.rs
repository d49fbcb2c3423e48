use chrono::Duration;
use std::time::Duration as StdDuration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Who may touch email-scoped records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessPolicy {
    /// Token email must match the path email, unless the caller is an admin.
    pub enforce_ownership: bool,
    /// Require a token on `PUT /user/{email}`. Off, anonymous callers may only
    /// register emails that do not exist yet.
    pub gate_user_upsert: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            enforce_ownership: true,
            gate_user_upsert: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub stripe_timeout: StdDuration,
    pub access: AccessPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            // Atlas credentials split across variables
            None => match (var("DB_USER"), var("DB_PASSWORD"), var("DB_HOST")) {
                (Some(user), Some(password), Some(host)) => format!(
                    "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                    user, password, host
                ),
                _ => return Err(ConfigError::Missing("DATABASE_URL")),
            },
        };

        let defaults = AccessPolicy::default();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(var("PORT"), "PORT", 5000)?,
            database_url,
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "toptool".to_string()),
            token_secret: required("ACCESS_TOKEN_SECRET")?,
            token_ttl: Duration::seconds(parse(var("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", 3600)?),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            stripe_timeout: StdDuration::from_secs(parse(
                var("STRIPE_TIMEOUT_SECS"),
                "STRIPE_TIMEOUT_SECS",
                10,
            )?),
            access: AccessPolicy {
                enforce_ownership: parse_bool(
                    var("ENFORCE_OWNERSHIP"),
                    "ENFORCE_OWNERSHIP",
                    defaults.enforce_ownership,
                )?,
                gate_user_upsert: parse_bool(
                    var("REQUIRE_AUTH_FOR_USER_UPSERT"),
                    "REQUIRE_AUTH_FOR_USER_UPSERT",
                    defaults.gate_user_upsert,
                )?,
            },
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid { key, value: v }),
    }
}
