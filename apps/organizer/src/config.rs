use std::net::IpAddr;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub api_host: IpAddr,
    pub api_port: u16,
    /// `tracing` level directive: trace, debug, info, warn or error.
    pub log_level: String,
    pub max_file_size_mb: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = optional("API_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .context("API_HOST must be an IP address")?;

        let api_port = optional("API_PORT", "8000")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;
        if api_port == 0 {
            bail!("API_PORT must be between 1 and 65535");
        }

        let max_file_size_mb = optional("MAX_FILE_SIZE_MB", "150")
            .parse::<u64>()
            .context("MAX_FILE_SIZE_MB must be a positive integer")?;
        if max_file_size_mb == 0 {
            bail!("MAX_FILE_SIZE_MB must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            anthropic_model: optional("ANTHROPIC_MODEL", DEFAULT_MODEL),
            api_host,
            api_port,
            log_level: normalize_log_level(&optional("LOG_LEVEL", "info"))?,
            max_file_size_mb,
        })
    }

    pub fn max_file_size_bytes(&self) -> usize {
        usize::try_from(self.max_file_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

/// Maps `LOG_LEVEL` onto a `tracing` level; accepts `WARNING`/`CRITICAL` aliases.
fn normalize_log_level(raw: &str) -> Result<String> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        other => bail!("LOG_LEVEL '{other}' is not one of trace, debug, info, warn, error"),
    };
    Ok(level.to_string())
}
