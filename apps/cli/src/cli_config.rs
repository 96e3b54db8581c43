use std::env;
use std::fmt;
use std::time::Duration;

use smartpro_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Credentials used to open a session before running a command.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub http_timeout: Duration,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let base_url = lookup("SMART_PRO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let credentials = match (
            optional_non_empty(&lookup, "SMART_PRO_USER"),
            optional_non_empty(&lookup, "SMART_PRO_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "SMART_PRO_USER and SMART_PRO_PASSWORD must be set together".to_owned(),
                ));
            }
        };

        let http_timeout_secs = parse_u64(
            &lookup,
            "SMART_PRO_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "SMART_PRO_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            base_url,
            credentials,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn optional_non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
