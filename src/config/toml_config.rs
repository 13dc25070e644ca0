use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_API_KEY: &str = "SDLC_API_KEY";
const ENV_API_ENDPOINT: &str = "SDLC_API_ENDPOINT";
const ENV_MODEL_ID: &str = "SDLC_MODEL_ID";

/// Generator backend settings, resolved from (lowest to highest precedence)
/// built-in defaults, a TOML file, and environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub model_id: String,
    pub output_path: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://eu-gb.ml.cloud.ibm.com/ml/v1/text/generation".to_string(),
            api_key: String::new(),
            model_id: "ibm/granite-3-8b-instruct".to_string(),
            output_path: "./output".to_string(),
            timeout_secs: 60,
        }
    }
}

/// On-disk shape of the config file:
///
/// ```toml
/// [generator]
/// api_endpoint = "https://..."
/// api_key = "..."
/// model_id = "ibm/granite-3-8b-instruct"
/// timeout_secs = 60
///
/// [output]
/// path = "./output"
/// ```
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    generator: Option<GeneratorSection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratorSection {
    api_endpoint: Option<String>,
    api_key: Option<String>,
    model_id: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputSection {
    path: Option<String>,
}

impl BackendConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// TOML file plus environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&data)?;

        let mut config = Self::default();
        if let Some(generator) = file.generator {
            if let Some(endpoint) = generator.api_endpoint {
                config.api_endpoint = endpoint;
            }
            if let Some(key) = generator.api_key {
                config.api_key = key;
            }
            if let Some(model) = generator.model_id {
                config.model_id = model;
            }
            if let Some(timeout) = generator.timeout_secs {
                config.timeout_secs = timeout;
            }
        }
        if let Some(output) = file.output {
            if let Some(path) = output.path {
                config.output_path = path;
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Ok(endpoint) = std::env::var(ENV_API_ENDPOINT) {
            self.api_endpoint = endpoint;
        }
        if let Ok(model) = std::env::var(ENV_MODEL_ID) {
            self.model_id = model;
        }
    }
}

impl ConfigProvider for BackendConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_non_empty_string("model_id", &self.model_id)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[generator]
api_endpoint = "https://models.example.com/generate"
api_key = "secret"
timeout_secs = 30

[output]
path = "./exports"
"#
        )
        .unwrap();

        let config = BackendConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_endpoint, "https://models.example.com/generate");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.output_path, "./exports");
        // Untouched fields keep their defaults
        assert_eq!(config.model_id, "ibm/granite-3-8b-instruct");
    }

    #[test]
    fn partial_file_is_accepted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[generator]\napi_key = \"k\"\n").unwrap();

        let config = BackendConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [[[").unwrap();
        assert!(BackendConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn default_config_validates() {
        assert!(BackendConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_endpoint_fails_validation() {
        let config = BackendConfig {
            api_endpoint: "not-a-url".to_string(),
            ..BackendConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
