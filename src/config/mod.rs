use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admission: AdmissionConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path = std::env::var("INSTALLMENT_API_CONFIG")
            .unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("INSTALLMENT_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        assert!(
            !self.database.url.is_empty(),
            "Database URL must be specified"
        );
        assert!(
            self.server.port > 0,
            "Server port must be greater than zero"
        );
        self.admission.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        assert!(self.port < 65535, "HTTP port must be below 65535");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionConfig {
    /// Sliding window during which an identical fingerprint is rejected
    #[serde(default = "AdmissionConfig::default_dedup_window_seconds")]
    pub dedup_window_seconds: u64,
    #[serde(default = "AdmissionConfig::default_rate_window_seconds")]
    pub rate_limit_window_seconds: u64,
    #[serde(default = "AdmissionConfig::default_rate_max_requests")]
    pub rate_limit_max_requests: u32,
    #[serde(default = "AdmissionConfig::default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl AdmissionConfig {
    pub fn dedup_window(&self) -> Duration {
        assert!(
            self.dedup_window_seconds >= 1,
            "Dedup window must be at least 1 second"
        );
        assert!(
            self.dedup_window_seconds <= 3600,
            "Dedup window cannot exceed one hour"
        );
        Duration::from_secs(self.dedup_window_seconds)
    }

    pub fn rate_window(&self) -> Duration {
        assert!(
            self.rate_limit_window_seconds >= 1,
            "Rate window must be at least 1 second"
        );
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        assert!(
            self.sweep_interval_ms >= 100,
            "Sweep interval must be >= 100ms"
        );
        assert!(
            self.sweep_interval_ms <= 60_000,
            "Sweep interval must be <= 60 seconds"
        );
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn ensure_bounds(&self) -> Result<()> {
        assert!(
            self.rate_limit_max_requests > 0,
            "Rate limit cap must be positive"
        );
        assert!(
            self.rate_limit_max_requests <= 1000,
            "Rate limit cap exceeds defensive limit"
        );
        let _ = self.dedup_window();
        let _ = self.rate_window();
        let _ = self.sweep_interval();
        Ok(())
    }

    const fn default_dedup_window_seconds() -> u64 {
        30
    }

    const fn default_rate_window_seconds() -> u64 {
        60
    }

    const fn default_rate_max_requests() -> u32 {
        5
    }

    const fn default_sweep_interval_ms() -> u64 {
        5_000
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
