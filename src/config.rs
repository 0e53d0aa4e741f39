use calai_core::estimate::{EstimateError, GroqClient};
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Groq estimation settings. Anything unset falls back to the client
/// defaults; the API key falls back to the one saved with `settings api-key`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroqConfig {
    #[serde(serialize_with = "mask_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub vision_model: Option<String>,
}

fn mask_key<S: Serializer>(key: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match key {
        Some(k) => serializer.serialize_str(&mask(k)),
        None => serializer.serialize_none(),
    }
}

/// Shows only the last four characters of a secret.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding calai-state.json
    pub data_dir: ConfigValue<PathBuf>,
    /// Log level for calai's own crates (RUST_LOG takes precedence)
    pub log_level: ConfigValue<String>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Estimation service settings
    pub groq: GroqConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
    groq: Option<GroqConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut log_level = ConfigValue::new("warn".to_string(), ConfigSource::Default);
        let mut config_file = None;
        let mut groq = GroqConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(level) = file_config.log_level {
                log_level = ConfigValue::new(level, ConfigSource::File);
            }
            if let Some(groq_config) = file_config.groq {
                groq = groq_config;
            }
        }

        if let Ok(dir) = std::env::var("CALAI_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(level) = std::env::var("CALAI_LOG_LEVEL") {
            log_level = ConfigValue::new(level, ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("CALAI_GROQ_API_KEY") {
            groq.api_key = Some(key);
        }

        Ok(Self {
            data_dir,
            log_level,
            config_file,
            groq,
        })
    }

    /// Builds the estimation client. A key from config or environment wins
    /// over the one saved in the state file.
    /// The configured Groq key, ignoring a blank one.
    pub fn groq_api_key(&self) -> Option<&str> {
        self.groq
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn groq_client(&self, saved_key: Option<&str>) -> Result<GroqClient, EstimateError> {
        let key = self.groq_api_key().or(saved_key);

        let mut client = GroqClient::new(key)?;
        if let Some(url) = &self.groq.base_url {
            client = client.with_base_url(url.as_str());
        }
        if let Some(model) = &self.groq.text_model {
            client = client.with_text_model(model.as_str());
        }
        if let Some(model) = &self.groq.vision_model {
            client = client.with_vision_model(model.as_str());
        }
        Ok(client)
    }

    /// `tracing` filter directive for calai's crates at the configured level.
    pub fn log_filter(&self) -> String {
        let level = &self.log_level.value;
        format!("calai={},calai_core={}", level, level)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/calai/
    /// - macOS: ~/Library/Application Support/calai/
    /// - Windows: %APPDATA%/calai/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calai")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/calai/
    /// - macOS: ~/Library/Application Support/calai/
    /// - Windows: %APPDATA%/calai/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calai")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("calai"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.log_level.value, "warn");
        assert!(config.config_file.is_none());
        assert!(config.groq.base_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/calai").unwrap();
        writeln!(file, "log_level: debug").unwrap();
        writeln!(file, "groq:").unwrap();
        writeln!(file, "  text_model: llama-test").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/calai"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.log_level.value, "debug");
        assert_eq!(config.groq.text_model.as_deref(), Some("llama-test"));
        assert_eq!(config.config_file, Some(config_path));
        assert_eq!(config.log_filter(), "calai=debug,calai_core=debug");
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: state").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /from/file").unwrap();

        std::env::set_var("CALAI_DATA_DIR", "/from/env");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);

        std::env::remove_var("CALAI_DATA_DIR");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_groq_client_key_precedence() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "groq:").unwrap();
        writeln!(file, "  base_url: http://localhost:1234/v1/").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.groq_client(None).unwrap_err(),
            EstimateError::GatewayUnavailable
        );
        let client = config.groq_client(Some("gsk_saved")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn test_blank_config_key_defers_to_saved() {
        let mut config = Config {
            data_dir: ConfigValue::new(PathBuf::from("/tmp/calai"), ConfigSource::Default),
            log_level: ConfigValue::new("warn".into(), ConfigSource::Default),
            config_file: None,
            groq: GroqConfig {
                api_key: Some("   ".into()),
                ..Default::default()
            },
        };
        assert!(config.groq_api_key().is_none());
        assert!(config.groq_client(Some("gsk_saved")).is_ok());

        config.groq.api_key = Some("gsk_config".into());
        assert_eq!(config.groq_api_key(), Some("gsk_config"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("gsk_abcdef1234"), "****1234");
        assert_eq!(mask("abc"), "****");
    }

    #[test]
    fn test_json_masks_api_key() {
        let config = Config {
            data_dir: ConfigValue::new(PathBuf::from("/tmp/calai"), ConfigSource::Default),
            log_level: ConfigValue::new("warn".into(), ConfigSource::Default),
            config_file: None,
            groq: GroqConfig {
                api_key: Some("gsk_secret9876".into()),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("****9876"));
        assert!(!json.contains("gsk_secret"));
    }
}
