use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "config/matru-live.json";

const ENV_API_URL: &str = "MATRU_API_URL";
const ENV_PUSH_URL: &str = "MATRU_PUSH_URL";
const ENV_ALERT_CAPACITY: &str = "MATRU_ALERT_CAPACITY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the monitoring backend REST API.
    pub api_base_url: String,
    /// Socket.IO websocket endpoint; derived from `api_base_url` when unset.
    pub push_url: Option<String>,
    /// Alerts kept on screen before the oldest is evicted.
    pub alert_capacity: usize,
    /// Buffered push events per subscriber before it starts lagging.
    pub channel_capacity: usize,
    pub reconnect_delay_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            push_url: None,
            alert_capacity: 50,
            channel_capacity: 256,
            reconnect_delay_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Websocket URL of the push channel.
    pub fn push_endpoint(&self) -> Result<Url, url::ParseError> {
        if let Some(push_url) = &self.push_url {
            return Url::parse(push_url);
        }

        let mut url = Url::parse(&self.api_base_url)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http -> ws keeps the url "special", so set_scheme cannot fail here.
        let _ = url.set_scheme(scheme);
        url.set_path("/socket.io/");
        url.set_query(Some("EIO=4&transport=websocket"));
        Ok(url)
    }

    /// Applies `MATRU_*` overrides on top of the file values.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_PUSH_URL) {
            self.push_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_ALERT_CAPACITY) {
            match raw.parse() {
                Ok(capacity) => self.alert_capacity = capacity,
                Err(err) => log::warn!("Ignoring {ENV_ALERT_CAPACITY}={raw}: {err}"),
            }
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with the environment lookup supplied by the caller.
pub fn load_config_with(path: &str, lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let path = Path::new(path);
    let mut config = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    };
    config.apply_overrides(lookup);
    config
}
