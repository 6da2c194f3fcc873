//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::AgentConfig;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<AgentConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<AgentConfig, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: AgentConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_empty_config_gives_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.batch_limit_bytes, 100 * 1024);
        assert!(config.upload_url.is_none());
    }

    #[test]
    fn load_basic_config() {
        let content = r#"
            time_to_yield_ms = 10
            batch_limit_bytes = 4096
            show_text = false

            [log]
            level = "debug"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.time_to_yield_ms, 10);
        assert_eq!(config.batch_limit_bytes, 4096);
        assert!(!config.show_text);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "upload_url = \"https://collector.test/batch\"").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(
            config.upload_url.as_deref(),
            Some("https://collector.test/batch")
        );
    }

    #[test]
    fn env_vars_expand() {
        std::env::set_var("RETRACE_TEST_URL", "https://collector.test/ingest");
        let config = ConfigLoader::load_str("upload_url = \"${RETRACE_TEST_URL}\"").unwrap();
        assert_eq!(
            config.upload_url.as_deref(),
            Some("https://collector.test/ingest")
        );
    }

    #[test]
    fn missing_env_var_errors() {
        let result = ConfigLoader::load_str("upload_url = \"${RETRACE_TEST_UNSET_VAR}\"");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        assert!(ConfigLoader::load_str("batch_limit_bytes = 0").is_err());
    }
}
