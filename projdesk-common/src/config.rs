//! Configuration file loading and tier resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are merged by the service's argument parser before they reach
//! this module, so the helpers here only see "explicit value" vs "TOML value".

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "projdesk";

/// Default config file name
const CONFIG_FILE_NAME: &str = "projdesk.toml";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// On-disk configuration
///
/// All fields are optional; anything absent falls through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    /// CRM private app access token
    pub hubspot_api_key: Option<String>,
    /// Custom object type id or name of the "project" schema
    pub project_object_type: Option<String>,
    pub hubspot_base_url: Option<String>,
    /// Association type label used when linking projects to contacts
    pub association_type: Option<String>,
    /// "per-page" or "per-project"
    pub batch_policy: Option<String>,
    pub static_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Platform default config file location (`~/.config/projdesk/projdesk.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Load the config file if there is one
///
/// An explicitly requested file must exist. The platform default file is
/// optional: when it is missing the compiled defaults are used.
pub fn load_optional_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "config file {}",
                path.display()
            )));
        }
        return load_toml_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_toml_config(&path),
        _ => Ok(TomlConfig::default()),
    }
}

/// Validate a configured string (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Pick the first valid value from the explicit tier or the TOML tier
///
/// Warns when both tiers carry a value, since the TOML one is then ignored.
pub fn resolve_optional(
    name: &str,
    explicit: Option<String>,
    from_toml: Option<String>,
) -> Option<String> {
    let explicit = explicit.filter(|v| is_valid_value(v));
    let from_toml = from_toml.filter(|v| is_valid_value(v));

    if explicit.is_some() && from_toml.is_some() {
        warn!(
            "{} found in both arguments/environment and TOML config. Using arguments/environment.",
            name
        );
    }

    explicit.or(from_toml)
}

/// Like [`resolve_optional`] but a missing value is a configuration error
///
/// `flag` and `env_var` are only used to build the error message.
pub fn resolve_required(
    name: &str,
    flag: &str,
    env_var: &str,
    explicit: Option<String>,
    from_toml: Option<String>,
) -> Result<String> {
    resolve_optional(name, explicit, from_toml).ok_or_else(|| {
        Error::Config(format!(
            "{name} not configured. Please configure using one of:\n\
             1. Command line: {flag} <value>\n\
             2. Environment: {env_var}=<value>\n\
             3. TOML config: {key} = \"<value>\"",
            key = name.to_lowercase().replace(' ', "_"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_value() {
        assert!(is_valid_value("abc"));
        assert!(!is_valid_value(""));
        assert!(!is_valid_value("   "));
    }

    #[test]
    fn test_resolve_optional_prefers_explicit() {
        let v = resolve_optional("port", Some("1".into()), Some("2".into()));
        assert_eq!(v.as_deref(), Some("1"));
    }

    #[test]
    fn test_resolve_optional_skips_blank_explicit() {
        let v = resolve_optional("host", Some("  ".into()), Some("0.0.0.0".into()));
        assert_eq!(v.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_resolve_required_error_names_sources() {
        let err = resolve_required(
            "Hubspot api key",
            "--hubspot-api-key",
            "HUBSPOT_API_KEY",
            None,
            None,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--hubspot-api-key"));
        assert!(msg.contains("HUBSPOT_API_KEY"));
        assert!(msg.contains("hubspot_api_key"));
    }

    #[test]
    fn test_logging_default_level() {
        assert_eq!(LoggingConfig::default().level, "info");
    }
}
