//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Env var holding a JSON array of endpoint URLs.
pub const RPC_URLS_ENV_VAR: &str = "SUI_RPC_URLS";

/// Env var holding a JSON array of proxy URLs.
pub const PROXIES_ENV_VAR: &str = "SUI_PROXIES";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: String, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML file, apply env overrides and validate.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus env overrides, without a file.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Replace endpoint/proxy lists with the JSON arrays in [`RPC_URLS_ENV_VAR`]
/// and [`PROXIES_ENV_VAR`] when those variables are set.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<(), ConfigError> {
    if let Some(urls) = read_env_list(RPC_URLS_ENV_VAR)? {
        config.rpc.endpoints = urls;
    }
    if let Some(proxies) = read_env_list(PROXIES_ENV_VAR)? {
        config.rpc.proxies = proxies;
    }
    Ok(())
}

fn read_env_list(var: &str) -> Result<Option<Vec<String>>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse_env_list(var, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_env_list(var: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Env {
        var: var.to_string(),
        message: format!("expected a JSON array of strings: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_env_list() {
        let urls = parse_env_list("X", r#"["https://a.example","https://b.example"]"#).unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);

        let err = parse_env_list("X", "https://a.example").unwrap_err();
        assert!(err.to_string().starts_with("Invalid X"));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("sui-multisend-{}.toml", uuid::Uuid::new_v4()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "[rpc]\nendpoints = [\"https://node.example\"]\n[retry]\nmax_retries = 2").unwrap();
        }
        let config = load_config(&path);
        let _ = fs::remove_file(&path);

        let config = config.unwrap();
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let path = std::env::temp_dir().join(format!("sui-multisend-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[transfer]\ngas_budget = 0\n").unwrap();
        let result = load_config(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
