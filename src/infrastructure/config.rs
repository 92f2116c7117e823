use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Environment overrides look like `WATERJET__INFLUX__TOKEN`
const ENV_PREFIX: &str = "WATERJET";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub influx: InfluxSettings,
    #[serde(default)]
    pub server: ListenSettings,
    #[serde(default)]
    pub fault_model: FaultModelSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub dates: DateSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    #[serde(default = "default_retention_policy")]
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_tag")]
    pub tag: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListenSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FaultModelSettings {
    #[serde(default = "default_min_temp")]
    pub min_temp: f64,
    #[serde(default = "default_max_temp")]
    pub max_temp: f64,
}

impl Default for FaultModelSettings {
    fn default() -> Self {
        Self {
            min_temp: default_min_temp(),
            max_temp: default_max_temp(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            window_hours: default_window_hours(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DateSettings {
    #[serde(default = "default_recent_days")]
    pub recent_days: u32,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            recent_days: default_recent_days(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplaySettings {
    /// Offset from UTC, in minutes, used for calendar days and minute-of-day
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl DisplaySettings {
    pub fn offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .with_context(|| format!("utc_offset_minutes {} is out of range", self.utc_offset_minutes))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_retention_policy() -> String {
    "autogen".to_string()
}

fn default_measurement() -> String {
    "waterjet".to_string()
}

fn default_field() -> String {
    "temperature".to_string()
}

fn default_tag() -> String {
    "waterjet_id".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_min_temp() -> f64 {
    25.0
}

fn default_max_temp() -> f64 {
    49.5
}

fn default_interval_secs() -> u64 {
    60
}

fn default_window_hours() -> u32 {
    1
}

fn default_recent_days() -> u32 {
    7
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    load("config/server", true)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load("config/dashboard", false)
}

fn load<T: DeserializeOwned>(name: &str, required: bool) -> anyhow::Result<T> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(required))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .with_context(|| format!("Failed to read configuration {}", name))?;

    settings
        .try_deserialize()
        .with_context(|| format!("Invalid configuration {}", name))
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
