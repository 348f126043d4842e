//! Logging initialization
//!
//! RUST_LOG takes priority over the config file; the default is info
//! level with the human-readable format.

use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Logging settings from the `[log]` config section.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// error, warn, info, debug, trace
    pub level: String,
    /// pretty, compact, json
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging(config: Option<&LogConfig>) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = config.map(|c| parse_level(&c.level)).unwrap_or(Level::INFO);
        EnvFilter::new(level.as_str())
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.map(|c| c.format.as_str()).unwrap_or("pretty") {
        "json" => {
            let _ = registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init();
        }
        "compact" => {
            let _ = registry
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init();
        }
        _ => {
            let _ = registry.with(tracing_subscriber::fmt::layer()).try_init();
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }
}
