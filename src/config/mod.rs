//! Configuration management
//!
//! Loads the policy file, validates it, and wires a pipeline from it.
//! The config surface is the management collaborator; the frame path
//! never touches it.

mod types;
mod validation;

pub use types::*;
pub use validation::{validate, ValidationResult};

use std::path::Path;

use zeroize::Zeroize;

use crate::pipeline::SecurityPipeline;
use crate::platform::Platform;
use crate::{Error, Result};

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}

/// Construct a pipeline from a configuration.
///
/// Errors out on unparseable addresses, over-capacity lists and bad key
/// material; run `validate` first for a friendlier report.
pub fn build_pipeline(config: &Config) -> Result<SecurityPipeline> {
    let mut pipeline = SecurityPipeline::new();

    let filter = pipeline.mac_filter_mut();
    filter.set_mode(config.filter.mode.into());
    for addr in &config.filter.allowed {
        filter.add_allowed(addr.parse()?)?;
    }
    for addr in &config.filter.blocked {
        filter.add_blocked(addr.parse()?)?;
    }

    let inspector = pipeline.inspector_mut();
    use crate::protocol::ipv4::Protocol;
    inspector.set_protocol_blocked(Protocol::Icmp, config.firewall.block_icmp);
    inspector.set_protocol_blocked(Protocol::Tcp, config.firewall.block_tcp);
    inspector.set_protocol_blocked(Protocol::Udp, config.firewall.block_udp);
    for &port in &config.firewall.blocked_ports {
        inspector.add_blocked_port(port)?;
    }

    if let Some(key_hex) = &config.cipher.key {
        let mut key = hex::decode(key_hex)
            .map_err(|e| Error::Config(format!("cipher.key is not valid hex: {e}")))?;
        let result = pipeline.cipher_mut().set_key(&key);
        key.zeroize();
        result?;
    }
    pipeline.cipher_mut().set_enabled(config.cipher.enabled);

    Ok(pipeline)
}

/// Platform capabilities described by the configuration
pub fn platform(config: &Config) -> Platform {
    Platform::new(config.platform.secure_boot)
}
