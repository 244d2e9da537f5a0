//! Portal configuration.
//!
//! Layers, each overriding the previous:
//! 1. Defaults
//! 2. TOML file
//! 3. Environment (`DOCDESK_WS_URL`, `DOCDESK_API_BASE_URL`)

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use docdesk_core::EDIT_REQUEST_PAGE_SIZE;
use docdesk_live::LiveConfig;

/// Overrides the push server URL.
pub const WS_URL_ENV: &str = "DOCDESK_WS_URL";
/// Overrides the REST API base URL.
pub const API_BASE_URL_ENV: &str = "DOCDESK_API_BASE_URL";

/// Configuration for a [`Portal`](crate::Portal) session.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Push connection settings.
    pub live: LiveConfig,
    /// Backend base URL; REST routes live under `/api`.
    pub api_base_url: String,
    /// Timeout applied to list fetches.
    pub request_timeout: Duration,
    /// Page size of edit-request lists.
    pub edit_request_page_size: u32,
    /// Page size of document lists.
    pub document_page_size: u32,
    /// How long `poll_events` waits for the first event.
    pub receive_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            live: LiveConfig::default(),
            api_base_url: "http://localhost:3001".to_owned(),
            request_timeout: Duration::from_millis(15_000),
            edit_request_page_size: EDIT_REQUEST_PAGE_SIZE,
            document_page_size: 10,
            receive_timeout: Duration::ZERO,
        }
    }
}

/// On-disk shape. Every key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    live: LiveSection,
    api: ApiSection,
    lists: ListsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LiveSection {
    ws_url: Option<String>,
    connect_timeout_ms: Option<u64>,
    max_events_per_drain: Option<usize>,
    receive_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ApiSection {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ListsSection {
    edit_request_page_size: Option<u32>,
    document_page_size: Option<u32>,
}

impl PortalConfig {
    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("failed to parse config")?;
        let mut config = Self::default();

        if let Some(url) = file.live.ws_url {
            config.live.ws_url = url;
        }
        if let Some(ms) = file.live.connect_timeout_ms {
            config.live.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = file.live.max_events_per_drain {
            config.live.max_events_per_drain = max;
        }
        if let Some(ms) = file.live.receive_timeout_ms {
            config.receive_timeout = Duration::from_millis(ms);
        }
        if let Some(url) = file.api.base_url {
            config.api_base_url = url;
        }
        if let Some(ms) = file.api.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(size) = file.lists.edit_request_page_size {
            config.edit_request_page_size = size;
        }
        if let Some(size) = file.lists.document_page_size {
            config.document_page_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(WS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(%url, "push server URL overridden from environment");
            self.live.ws_url = url;
        }
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(%url, "API base URL overridden from environment");
            self.api_base_url = url;
        }
    }

    /// Root of the REST routes.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api_base_url.trim_end_matches('/'))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.edit_request_page_size == 0 || self.document_page_size == 0 {
            bail!("page sizes must be at least 1");
        }
        if self.live.max_events_per_drain == 0 {
            bail!("max_events_per_drain must be at least 1");
        }
        Ok(())
    }
}
