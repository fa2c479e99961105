use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::access::GateConfig;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PAYMENT_KEY: &str = "rzp_test_xxxxxxxxxxxxxx";

const BACKEND_URL_ENV: &str = "BACKEND_URL";
const PAYMENT_KEY_ENV: &str = "RAZORPAY_KEY_ID";
const SESSION_COOKIE_ENV: &str = "STOREFRONT_SESSION_COOKIE";

#[derive(Debug, Parser)]
#[command(
    name = "storefront-gateway",
    version,
    about = "Edge gateway for the Vijay Brothers saree storefront"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    #[arg(long, value_name = "DIR")]
    pub site_root: Option<PathBuf>,

    #[arg(long, value_name = "DURATION")]
    pub backend_timeout: Option<String>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub backend_url: Url,
    pub backend_timeout: Option<Duration>,
    pub payment_key: String,
    pub site_root: PathBuf,
    pub gate: GateConfig,
    pub rate_limit: RateLimitConfig,
    pub max_body_bytes: usize,
}

/// Per-client request quota: `burst_size` requests at once, refilled at
/// `requests_per_second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests_per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 20,
            burst_size: 50,
        }
    }
}

impl RateLimitConfig {
    /// Time between replenishing one request of a client's quota.
    pub fn replenish_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.requests_per_second.max(1))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid backend url {value}: {reason}")]
    InvalidBackendUrl { value: String, reason: String },
    #[error("invalid backend timeout {value}: {source}")]
    InvalidTimeout {
        value: String,
        source: humantime::DurationError,
    },
    #[error("env var {key} is not valid unicode")]
    NonUnicodeEnv { key: String },
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    backend_url: Option<String>,
    backend_timeout: Option<String>,
    payment_key: Option<String>,
    site_root: Option<PathBuf>,
    max_body_bytes: Option<usize>,
    gate: Option<GateConfig>,
    rate_limit: Option<RateLimitConfig>,
}

/// Values picked up from the process environment at startup.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub backend_url: Option<String>,
    pub payment_key: Option<String>,
    pub session_cookie: Option<String>,
}

impl EnvOverrides {
    pub fn from_process() -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: read_env_string(BACKEND_URL_ENV)?,
            payment_key: read_env_string(PAYMENT_KEY_ENV)?,
            session_cookie: read_env_string(SESSION_COOKIE_ENV)?,
        })
    }
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_cli_with_env(cli, EnvOverrides::from_process()?)
    }

    pub fn from_cli_with_env(cli: Cli, env: EnvOverrides) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;
        Self::resolve(cli, from_file, env)
    }

    fn resolve(cli: Cli, from_file: FileConfig, env: EnvOverrides) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or(from_file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
        let backend_raw = cli
            .backend_url
            .or(env.backend_url)
            .or(from_file.backend_url)
            .unwrap_or_else(|| String::from(DEFAULT_BACKEND_URL));
        let backend_url = parse_backend_url(&backend_raw)?;
        let backend_timeout = cli
            .backend_timeout
            .or(from_file.backend_timeout)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;
        let payment_key = env
            .payment_key
            .or(from_file.payment_key)
            .unwrap_or_else(|| String::from(DEFAULT_PAYMENT_KEY));
        let site_root = cli
            .site_root
            .or(from_file.site_root)
            .unwrap_or_else(|| PathBuf::from("./public"));

        let mut gate = from_file.gate.unwrap_or_default();
        if let Some(cookie) = env.session_cookie {
            gate.session_cookie = cookie;
        }

        let rate_limit = from_file.rate_limit.unwrap_or_default();
        let rate_limit = RateLimitConfig {
            requests_per_second: rate_limit.requests_per_second.clamp(1, 1_000_000_000),
            burst_size: rate_limit.burst_size.max(1),
        };

        Ok(Self {
            bind,
            backend_url,
            backend_timeout,
            payment_key,
            site_root,
            gate,
            rate_limit,
            max_body_bytes: from_file.max_body_bytes.unwrap_or(2 * 1024 * 1024).max(1),
        })
    }

    pub fn uses_placeholder_payment_key(&self) -> bool {
        self.payment_key == DEFAULT_PAYMENT_KEY
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicodeEnv {
            key: String::from(key),
        }),
    }
}

/// Parses the backend base URL. A trailing slash is dropped so endpoint
/// suffixes can be appended verbatim.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBackendUrl {
        value: String::from(raw),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBackendUrl {
            value: String::from(raw),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidBackendUrl {
            value: String::from(raw),
            reason: String::from("query and fragment are not allowed"),
        });
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigError::InvalidTimeout {
        value: String::from(raw),
        source,
    })
}
