//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `INQUIRY_*` environment variables (or the matching CLI
//! flags). Everything is optional: with no configuration the service runs on
//! in-memory adapters and logs notifications instead of delivering them.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::domain::{DEFAULT_MAX_CONFLICT_RETRIES, HookMode, PrincipalId};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CATALOGUE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_WEBHOOK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised when a configured value cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid INQUIRY_BIND_ADDR '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid INQUIRY_SUPER_ADMIN_ID '{value}': {message}")]
    SuperAdminId { value: String, message: String },
    #[error("invalid {name} '{value}': {source}")]
    Url {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Runtime settings for the inquiry service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INQUIRY")]
pub struct InquirySettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Account id granted super-admin rights when it holds the admin role.
    ///
    /// Numeric ids arrive from the environment as integers, so both forms
    /// are accepted.
    #[serde(default, deserialize_with = "string_or_number")]
    pub super_admin_id: Option<String>,
    /// How often a lost revision race is retried before `write_conflict`.
    pub max_conflict_retries: Option<u32>,
    /// PostgreSQL URL; the in-memory repository is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Base URL of the product catalogue service.
    pub catalogue_url: Option<String>,
    pub catalogue_timeout_ms: Option<u64>,
    /// Endpoint receiving notification webhooks.
    pub notify_webhook_url: Option<String>,
    pub notify_timeout_ms: Option<u64>,
    /// Await post-commit hooks before responding instead of detaching them.
    #[ortho_config(default = false)]
    pub hooks_inline: bool,
}

impl InquirySettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn super_admin_id(&self) -> Result<Option<PrincipalId>, SettingsError> {
        self.super_admin_id
            .as_deref()
            .map(|raw| {
                PrincipalId::new(raw).map_err(|err| SettingsError::SuperAdminId {
                    value: raw.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    pub fn max_conflict_retries(&self) -> u32 {
        self.max_conflict_retries
            .unwrap_or(DEFAULT_MAX_CONFLICT_RETRIES)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn catalogue_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("INQUIRY_CATALOGUE_URL", self.catalogue_url.as_deref())
    }

    pub fn catalogue_timeout(&self) -> Duration {
        Duration::from_millis(
            self.catalogue_timeout_ms
                .unwrap_or(DEFAULT_CATALOGUE_TIMEOUT_MS),
        )
    }

    pub fn notify_webhook_url(&self) -> Result<Option<Url>, SettingsError> {
        parse_url("INQUIRY_NOTIFY_WEBHOOK_URL", self.notify_webhook_url.as_deref())
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms.unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_MS))
    }

    pub fn hook_mode(&self) -> HookMode {
        if self.hooks_inline {
            HookMode::Inline
        } else {
            HookMode::Detached
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        StringOrNumber::String(text) => text,
        StringOrNumber::Unsigned(number) => number.to_string(),
        StringOrNumber::Signed(number) => number.to_string(),
    }))
}

fn parse_url(name: &'static str, raw: Option<&str>) -> Result<Option<Url>, SettingsError> {
    raw.map(|value| {
        Url::parse(value).map_err(|source| SettingsError::Url {
            name,
            value: value.to_owned(),
            source,
        })
    })
    .transpose()
}
