use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Runtime configuration for the whole monitor.
///
/// Loaded once at startup and handed to constructors; credentials never
/// live in process-wide mutable state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub feed: FeedSettings,
    pub report: ReportSettings,
}

/// Settings for the acquisition pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Quote API endpoint
    pub quote_api_base_url: String,
    /// Quote API credential; without one the live source is disabled
    pub quote_api_key: Option<String>,
    /// REST endpoint of the hosted store holding scraped rows
    pub scrape_store_url: Option<String>,
    pub scrape_store_key: Option<String>,
    /// Upper bound for one source round trip
    pub request_timeout_secs: u64,
    /// Pause between successive upstream calls, keeps the free-tier
    /// rate limit budget intact
    pub request_spacing_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            quote_api_base_url: "https://www.alphavantage.co/query".to_string(),
            quote_api_key: None,
            scrape_store_url: None,
            scrape_store_key: None,
            request_timeout_secs: 10,
            request_spacing_ms: 800,
        }
    }
}

impl FeedSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }
}

/// Settings for digest mail dispatch
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub mail_api_url: String,
    pub mail_api_key: Option<String>,
    pub sender: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            mail_api_url: "https://api.resend.com/emails".to_string(),
            mail_api_key: None,
            sender: "Rohstoff Monitor <onboarding@resend.dev>".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load from an explicit path, from `monitor.toml` in the working
    /// directory if present, or fall back to defaults. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let fallback = Path::new("monitor.toml");
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Ok(toml::from_str(&text)?)
    }

    /// Secrets come from the environment when set there.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            if !key.is_empty() {
                self.feed.quote_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            if !url.is_empty() {
                self.feed.scrape_store_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("SUPABASE_SERVICE_ROLE_KEY") {
            if !key.is_empty() {
                self.feed.scrape_store_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("RESEND_API_KEY") {
            if !key.is_empty() {
                self.report.mail_api_key = Some(key);
            }
        }
    }
}
