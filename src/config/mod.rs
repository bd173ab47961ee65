#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{OpenGinError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const BASE_URL_CRUD: &str = "BASE_URL_CRUD";
pub const BASE_URL_QUERY: &str = "BASE_URL_QUERY";
pub const TIMEOUT_SECONDS: &str = "TIMEOUT_SECONDS";
/// Names a TOML file for `get_config` to load instead of the environment.
pub const CONFIG_FILE_ENV: &str = "OPENDATA_CONFIG";

pub const DEFAULT_BASE_URL_CRUD: &str = "http://0.0.0.0:8080";
pub const DEFAULT_BASE_URL_QUERY: &str = "http://0.0.0.0:8081";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Where the OpenGIN services live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "BASE_URL_CRUD")]
    pub base_url_crud: String,
    #[serde(rename = "BASE_URL_QUERY")]
    pub base_url_query: String,
    #[serde(rename = "TIMEOUT_SECONDS", default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL_CRUD, DEFAULT_BASE_URL_QUERY)
    }
}

impl Config {
    pub fn new(base_url_crud: impl Into<String>, base_url_query: impl Into<String>) -> Self {
        Self {
            base_url_crud: base_url_crud.into(),
            base_url_query: base_url_query.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Builds a config from a `{"BASE_URL_CRUD": ..., "BASE_URL_QUERY": ...}` mapping.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| OpenGinError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        let mut config = Self::new(required(BASE_URL_CRUD)?, required(BASE_URL_QUERY)?);
        if let Some(raw) = map.get(TIMEOUT_SECONDS) {
            config.timeout_seconds = parse_timeout(raw)?;
        }
        Ok(config)
    }

    /// Reads the environment, falling back to the local defaults for unset keys.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup(BASE_URL_CRUD).unwrap_or_else(|| DEFAULT_BASE_URL_CRUD.to_string()),
            lookup(BASE_URL_QUERY).unwrap_or_else(|| DEFAULT_BASE_URL_QUERY.to_string()),
        );
        if let Some(raw) = lookup(TIMEOUT_SECONDS) {
            config.timeout_seconds = parse_timeout(&raw)?;
        }
        Ok(config)
    }

    /// Loads a TOML file, see `from_toml_str`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` references with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OpenGinError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OpenGinError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        // unknown variables are left in place so validation reports them
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| OpenGinError::InvalidConfigValueError {
            field: TIMEOUT_SECONDS.to_string(),
            value: raw.to_string(),
            reason: format!("not a whole number of seconds: {}", e),
        })
}

impl Validate for Config {
    fn validate(&self) -> Result<()> {
        validate_url(BASE_URL_CRUD, &self.base_url_crud)?;
        validate_url(BASE_URL_QUERY, &self.base_url_query)?;
        validate_positive_number(TIMEOUT_SECONDS, self.timeout_seconds, 1)?;
        Ok(())
    }
}

/// The configuration the services are wired with.
///
/// Loads the TOML file named by `OPENDATA_CONFIG` when set, otherwise the
/// `BASE_URL_CRUD` / `BASE_URL_QUERY` / `TIMEOUT_SECONDS` environment
/// variables. The result is validated before it is returned.
pub fn get_config() -> Result<Config> {
    let config = match std::env::var(CONFIG_FILE_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            tracing::debug!("loading OpenGIN config from {}", path);
            Config::from_file(path)?
        }
        _ => Config::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_map() -> HashMap<String, String> {
        HashMap::from([
            (BASE_URL_CRUD.to_string(), "http://test:8080".to_string()),
            (BASE_URL_QUERY.to_string(), "http://test:8081".to_string()),
        ])
    }

    #[test]
    fn test_from_map() {
        let config = Config::from_map(&test_map()).unwrap();
        assert_eq!(config.base_url_crud, "http://test:8080");
        assert_eq!(config.base_url_query, "http://test:8081");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_map_missing_key() {
        let mut map = test_map();
        map.remove(BASE_URL_QUERY);
        let err = Config::from_map(&map).unwrap_err();
        assert!(matches!(err, OpenGinError::MissingConfigError { ref field } if field == BASE_URL_QUERY));
    }

    #[test]
    fn test_from_map_bad_timeout() {
        let mut map = test_map();
        map.insert(TIMEOUT_SECONDS.to_string(), "soon".to_string());
        assert!(Config::from_map(&map).is_err());
    }

    #[test]
    fn test_lookup_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());

        let config = Config::from_lookup(|key| match key {
            BASE_URL_QUERY => Some("https://query.example.org".to_string()),
            TIMEOUT_SECONDS => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url_crud, DEFAULT_BASE_URL_CRUD);
        assert_eq!(config.base_url_query, "https://query.example.org");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_toml_with_env_substitution() {
        std::env::set_var("OPENDATA_TEST_CRUD_HOST", "crud.internal");

        let toml_content = r#"
BASE_URL_CRUD = "http://${OPENDATA_TEST_CRUD_HOST}:8080"
BASE_URL_QUERY = "http://query.internal:8081"
TIMEOUT_SECONDS = 10
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url_crud, "http://crud.internal:8080");
        assert_eq!(config.timeout_seconds, 10);

        std::env::remove_var("OPENDATA_TEST_CRUD_HOST");
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let toml_content = r#"
BASE_URL_CRUD = "${OPENDATA_TEST_NEVER_SET}"
BASE_URL_QUERY = "http://query.internal:8081"
"#;
        let config = Config::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = Config::default();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"BASE_URL_CRUD = \"http://a:8080\"\nBASE_URL_QUERY = \"http://b:8081\"\n")
            .unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.base_url_query, "http://b:8081");
    }
}
