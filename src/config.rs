use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use log::info;
use serde_derive::Deserialize;

pub const DEFAULT_ENDPOINT_URL: &str = "https://esp-server-c5yc.onrender.com/fetch";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct AppConfig {
    pub endpoint: Option<EndpointConfig>,
    pub location: Option<LocationConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    /// Great-circle distance between observer and beacon.
    #[default]
    Haversine,
    /// The fixed "2.4 km" readout of the legacy tracker page.
    Placeholder,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct DisplayConfig {
    pub distance: Option<DistanceMode>,
}

impl AppConfig {
    /// Reads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::de::from_str(contents)?;
        if config.poll_interval().is_zero() {
            anyhow::bail!("endpoint.poll_interval_ms must be greater than zero");
        }
        Ok(config)
    }

    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .as_ref()
            .and_then(|e| e.url.clone())
            .unwrap_or(DEFAULT_ENDPOINT_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.endpoint
                .as_ref()
                .and_then(|e| e.timeout_seconds)
                .unwrap_or(5),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.endpoint
                .as_ref()
                .and_then(|e| e.poll_interval_ms)
                .unwrap_or(5000),
        )
    }

    pub fn distance_mode(&self) -> DistanceMode {
        self.display
            .as_ref()
            .and_then(|d| d.distance)
            .unwrap_or_default()
    }
}
