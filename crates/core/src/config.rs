use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::assets::{get_config_dir, get_default_config};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Error, Debug)]
pub enum AshaConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Connection settings for the chat and resume service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub user_agent: Option<String>,
}

impl ServiceConfig {
    pub fn from_base_url(base_url: &str) -> Result<Self, AshaConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            user_agent: None,
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub theme: String,
}

impl Config {
    /// Replaces the configured service url, e.g. from a command line flag.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AshaConfigError> {
        self.service.base_url = parse_base_url(base_url)?;
        Ok(self)
    }
}

fn default_theme() -> String {
    "dark".to_string()
}

fn parse_base_url(raw: &str) -> Result<Url, AshaConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AshaConfigError::Config(format!("Invalid service url '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AshaConfigError::Config(format!(
            "Service url '{raw}' cannot be used as a base"
        )));
    }
    Ok(url)
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrObject<T> {
    String(String),
    Object(T),
}

#[derive(Deserialize, Debug)]
struct RawServiceConfig {
    base_url: String,
    #[serde(default)]
    user_agent: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    service: Option<StringOrObject<RawServiceConfig>>,
    theme: Option<String>,
}

impl RawConfig {
    #[instrument]
    fn to_config(&self) -> Result<Config, AshaConfigError> {
        let service = match &self.service {
            Some(StringOrObject::String(s)) => ServiceConfig::from_base_url(s)?,
            Some(StringOrObject::Object(raw)) => ServiceConfig {
                base_url: parse_base_url(&raw.base_url)?,
                user_agent: raw.user_agent.clone(),
            },
            None => ServiceConfig::default(),
        };

        Ok(Config {
            service,
            theme: self.theme.clone().unwrap_or_else(default_theme),
        })
    }
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), AshaConfigError> {
    let actual_path = config_path.unwrap_or_else(|| {
        let config_dir = get_config_dir();
        config_dir.join("asha.yml")
    });

    let parent_dir = actual_path.parent().ok_or_else(|| {
        AshaConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, AshaConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let raw: RawConfig = serde_yaml::from_str(&content)?;
    raw.to_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_temp_config;
    use tempfile::tempdir;

    #[test]
    fn test_get_config_creates_default_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("asha.yml");

        let (existed, path) = create_or_get_config_file(Some(config_path.clone())).unwrap();
        assert!(!existed);
        assert_eq!(path, config_path);
        assert!(config_path.exists());

        let config = get_config(Some(config_path.clone())).unwrap();
        assert_eq!(config.service.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.theme, "dark");

        let (existed, _) = create_or_get_config_file(Some(config_path)).unwrap();
        assert!(existed);
    }

    #[test]
    fn test_service_as_string() {
        let path = create_temp_config("service: http://chat.example.com:9000\ntheme: light\n");
        let config = get_config(Some(path)).unwrap();
        assert_eq!(
            config.service.base_url.as_str(),
            "http://chat.example.com:9000/"
        );
        assert_eq!(config.service.user_agent, None);
        assert_eq!(config.theme, "light");
    }

    #[test]
    fn test_service_as_object() {
        let path = create_temp_config(
            r#"
service:
  base_url: https://asha.example.com/api/
  user_agent: asha-test
"#,
        );
        let config = get_config(Some(path)).unwrap();
        assert_eq!(
            config.service.base_url.as_str(),
            "https://asha.example.com/api/"
        );
        assert_eq!(config.service.user_agent.as_deref(), Some("asha-test"));
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_missing_service_uses_default() {
        let path = create_temp_config("theme: light\n");
        let config = get_config(Some(path)).unwrap();
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_invalid_service_url() {
        let path = create_temp_config("service: not a url\n");
        let err = get_config(Some(path)).unwrap_err();
        assert!(
            matches!(err, AshaConfigError::Config(msg) if msg.contains("Invalid service url 'not a url'"))
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let path = create_temp_config("service: [unclosed\n");
        let err = get_config(Some(path)).unwrap_err();
        assert!(matches!(err, AshaConfigError::YAMLError(_)));
    }

    #[test]
    fn test_with_base_url_override() {
        let path = create_temp_config("service: http://127.0.0.1:8000\n");
        let config = get_config(Some(path))
            .unwrap()
            .with_base_url("http://localhost:1234")
            .unwrap();
        assert_eq!(config.service.base_url.as_str(), "http://localhost:1234/");

        let err = Config {
            service: ServiceConfig::default(),
            theme: default_theme(),
        }
        .with_base_url("mailto:someone@example.com")
        .unwrap_err();
        assert!(matches!(err, AshaConfigError::Config(msg) if msg.contains("cannot be used as a base")));
    }
}
