//! Configuration types

use serde::Deserialize;

use crate::pipeline::FilterMode;
use crate::telemetry::LogConfig;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub firewall: FirewallConfig,
    #[serde(default)]
    pub cipher: CipherConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub log: LogSettings,
}

/// `[filter]` - MAC address admission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub mode: FilterModeSetting,
    /// Addresses admitted in whitelist mode
    #[serde(default)]
    pub allowed: Vec<String>,
    /// Addresses denied in any mode
    #[serde(default)]
    pub blocked: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterModeSetting {
    #[default]
    Blacklist,
    Whitelist,
}

impl From<FilterModeSetting> for FilterMode {
    fn from(setting: FilterModeSetting) -> Self {
        match setting {
            FilterModeSetting::Blacklist => FilterMode::Blacklist,
            FilterModeSetting::Whitelist => FilterMode::Whitelist,
        }
    }
}

/// `[firewall]` - protocol and port inspection policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirewallConfig {
    #[serde(default)]
    pub block_icmp: bool,
    #[serde(default)]
    pub block_tcp: bool,
    #[serde(default)]
    pub block_udp: bool,
    /// Destination ports rejected for TCP and UDP
    #[serde(default)]
    pub blocked_ports: Vec<u16>,
}

/// `[cipher]` - payload transform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CipherConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 256-bit key as 64 hex digits
    pub key: Option<String>,
}

/// `[platform]` - capabilities reported by the platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub secure_boot: bool,
}

/// `[log]` - logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl From<&LogSettings> for LogConfig {
    fn from(settings: &LogSettings) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.clone(),
        }
    }
}
