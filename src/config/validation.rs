//! Configuration validation

use super::{Config, FilterModeSetting};
use crate::pipeline::{KEY_SIZE, MAX_ALLOWED_ADDRS, MAX_BLOCKED_ADDRS, MAX_BLOCKED_PORTS};
use crate::protocol::MacAddr;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_filter(config, &mut result);
    validate_firewall(config, &mut result);
    validate_cipher(config, &mut result);
    validate_log(config, &mut result);

    result
}

fn parse_macs(entries: &[String], list: &str, result: &mut ValidationResult) -> Vec<MacAddr> {
    let mut parsed = Vec::new();
    for entry in entries {
        match entry.parse::<MacAddr>() {
            Ok(mac) => parsed.push(mac),
            Err(e) => result.error(format!("filter.{list}: {e}")),
        }
    }
    parsed
}

fn validate_filter(config: &Config, result: &mut ValidationResult) {
    let allowed = parse_macs(&config.filter.allowed, "allowed", result);
    let blocked = parse_macs(&config.filter.blocked, "blocked", result);

    if allowed.len() > MAX_ALLOWED_ADDRS {
        result.error(format!(
            "filter.allowed: {} entries exceed the capacity of {}",
            allowed.len(),
            MAX_ALLOWED_ADDRS
        ));
    }
    if blocked.len() > MAX_BLOCKED_ADDRS {
        result.error(format!(
            "filter.blocked: {} entries exceed the capacity of {}",
            blocked.len(),
            MAX_BLOCKED_ADDRS
        ));
    }

    for mac in &allowed {
        if blocked.contains(mac) {
            result.warn(format!(
                "filter: {mac} is in both lists; the blocked list wins"
            ));
        }
    }

    if config.filter.mode == FilterModeSetting::Whitelist && config.filter.allowed.is_empty() {
        result.warn("filter: whitelist mode with an empty allowed list denies all unicast traffic");
    }
}

fn validate_firewall(config: &Config, result: &mut ValidationResult) {
    let ports = &config.firewall.blocked_ports;
    if ports.len() > MAX_BLOCKED_PORTS {
        result.error(format!(
            "firewall.blocked_ports: {} entries exceed the capacity of {}",
            ports.len(),
            MAX_BLOCKED_PORTS
        ));
    }

    for (i, port) in ports.iter().enumerate() {
        if ports[..i].contains(port) {
            result.warn(format!("firewall.blocked_ports: duplicate port {port}"));
        }
    }
}

fn validate_cipher(config: &Config, result: &mut ValidationResult) {
    match &config.cipher.key {
        Some(key_hex) => match hex::decode(key_hex) {
            Ok(key) => {
                if key.len() != KEY_SIZE {
                    result.error(format!(
                        "cipher.key: expected {} bytes ({} hex digits), got {}",
                        KEY_SIZE,
                        KEY_SIZE * 2,
                        key.len()
                    ));
                }
            }
            Err(e) => result.error(format!("cipher.key: not valid hex: {e}")),
        },
        None => {
            if config.cipher.enabled {
                result.warn("cipher: enabled without a key; frames pass through unencrypted");
            }
        }
    }
}

fn validate_log(config: &Config, result: &mut ValidationResult) {
    let level = config.log.level.to_lowercase();
    if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
        result.warn(format!(
            "log.level: unknown level '{}', falling back to info",
            config.log.level
        ));
    }
    if !["pretty", "compact", "json"].contains(&config.log.format.as_str()) {
        result.warn(format!(
            "log.format: unknown format '{}', falling back to pretty",
            config.log.format
        ));
    }
}
