use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

/// Upstream API of one chain.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    pub enable: bool,
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsConfig {
    pub ontology: PlatformConfig,
    pub aion: PlatformConfig,
    pub tron: PlatformConfig,
    pub bsc: PlatformConfig,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Zero runs the watch list once and exits.
    pub interval_seconds: u64,
    /// Upper bound on fetches in flight at the same time.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub output: String,
    pub format: String,
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub coin: u32,
    pub address: String,
    pub asset: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub platforms: PlatformsConfig,
    pub scheduler: SchedulerConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("TXATLAS").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[log]
level = "info"
output = "stdout"
format = "text"
file_path = "logs"
file_name = "txatlas.log"

[scheduler]
interval_seconds = 0
concurrency = 4

[http]
timeout_seconds = 10

[platforms.ontology]
enable = true
api_url = "https://explorer.ont.io/api/v1/explorer"

[platforms.aion]
enable = false
api_url = "https://mainnet-api.theoan.com/aion/dashboard"

[platforms.tron]
enable = true
api_url = "https://api.trongrid.io"

[platforms.bsc]
enable = true
api_url = "https://api.bscscan.com/api"
api_key = "secret"

[[watch]]
coin = 1024
address = "AUyL4TZ1zFEcSKDJrjFnD7vsq5iFZMZqT7"
asset = "ong"
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(config.platforms.ontology.enable);
        assert!(!config.platforms.aion.enable);
        assert_eq!(config.platforms.tron.api_key, None);
        assert_eq!(config.platforms.bsc.api_key.as_deref(), Some("secret"));
        assert_eq!(config.scheduler.concurrency, 4);
        assert_eq!(config.watch.len(), 1);
        assert_eq!(config.watch[0].coin, 1024);
        assert_eq!(config.watch[0].asset, "ong");
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(AppConfig::from_toml("[log]\nlevel = \"info\"").is_err());
    }
}
