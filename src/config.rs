use crate::error::ConfigError;
use crate::layout::Layout;
use crate::source::DEFAULT_MAX_BYTES;

/// Runtime configuration, loaded from environment variables.
/// CLI flags override whatever is set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub layout: Layout,
    /// Size ceiling for one source file; None disables it
    pub max_bytes: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layout: Layout::Portaria671,
            max_bytes: Some(DEFAULT_MAX_BYTES),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let layout = match lookup("AFD_LAYOUT") {
            Some(value) if !value.trim().is_empty() => value
                .parse::<Layout>()
                .map_err(|_| ConfigError::Invalid("AFD_LAYOUT", "expected 671 or 1510".to_string()))?,
            _ => defaults.layout,
        };

        let max_bytes = match lookup("AFD_MAX_BYTES") {
            Some(value) if !value.trim().is_empty() => parse_max_bytes(&value)
                .map_err(|msg| ConfigError::Invalid("AFD_MAX_BYTES", msg))?,
            _ => defaults.max_bytes,
        };

        let log_level = lookup("AFD_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_level);

        Ok(Config {
            layout,
            max_bytes,
            log_level,
        })
    }
}

/// "0" disables the ceiling
pub fn parse_max_bytes(value: &str) -> Result<Option<u64>, String> {
    let bytes = value
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("'{}' is not a byte count", value))?;
    Ok(if bytes == 0 { None } else { Some(bytes) })
}
