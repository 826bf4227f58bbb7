use std::path::Path;

use tracing::warn;

use crate::ai::QLearningConfig;
use crate::checkpoint::AgentStoreConfig;
use crate::error::ConfigError;
use crate::game::EngineConfig;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub q_learning: QLearningConfig,
    pub engine: EngineConfig,
    pub training: TrainerConfig,
    pub store: AgentStoreConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.q_learning;
        if q.learning_rate <= 0.0 || q.learning_rate > 1.0 {
            return Err(ConfigError::Validation(
                "q_learning.learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.discount_factor) {
            return Err(ConfigError::Validation(
                "q_learning.discount_factor must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.exploration_rate) {
            return Err(ConfigError::Validation(
                "q_learning.exploration_rate must be in [0, 1]".into(),
            ));
        }
        if self.training.iterations == 0 {
            return Err(ConfigError::Validation(
                "training.iterations must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.store.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store.data_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[q_learning]
learning_rate = 0.5
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!((config.q_learning.learning_rate - 0.5).abs() < 1e-9);
        assert!((config.q_learning.discount_factor - 0.1).abs() < 1e-9);
        assert_eq!(config.training.iterations, 10_000);
        assert_eq!(config.engine.max_resamples, 64);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.q_learning, QLearningConfig::default());
        assert_eq!(config.store.data_dir, Path::new("Data"));
    }

    #[test]
    fn test_validation_rejects_zero_iterations() {
        let mut config = AppConfig::default();
        config.training.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_learning_rate() {
        let mut config = AppConfig::default();
        config.q_learning.learning_rate = 0.0;
        assert!(config.validate().is_err());
        config.q_learning.learning_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_discount_out_of_range() {
        let mut config = AppConfig::default();
        config.q_learning.discount_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_exploration_out_of_range() {
        let mut config = AppConfig::default();
        config.q_learning.exploration_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_log_interval() {
        let mut config = AppConfig::default();
        config.training.log_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.training.iterations, 10_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[training]
iterations = 500

[store]
data_dir = "agents"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.iterations, 500);
        assert_eq!(config.store.data_dir, Path::new("agents"));
        assert!((config.q_learning.learning_rate - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[q_learning]\ndiscount_factor = 2.0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}
