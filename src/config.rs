use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dataset_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Class labels in model output order. Defaults to the sorted distinct
    /// values of the dataset's recommendation column.
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Refuse to start when the dataset holds a category with no encoding.
    pub strict_categories: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("Haircut_Dataset.csv"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model.onnx"),
            labels: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| AppError::Configuration {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml(&contents)?;
        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        toml::from_str(contents).map_err(|e| AppError::Configuration {
            message: e.to_string(),
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_test::traced_test;

    #[test]
    fn defaults_bind_all_interfaces_on_5001() {
        let config = Config::default();
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 5001));
        assert_eq!(config.data.dataset_path, PathBuf::from("Haircut_Dataset.csv"));
        assert_eq!(config.model.path, PathBuf::from("model.onnx"));
        assert!(config.model.labels.is_none());
        assert!(!config.validation.strict_categories);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [model]
            labels = ["Buzz Cut", "Pompadour"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.model.labels,
            Some(vec!["Buzz Cut".to_string(), "Pompadour".to_string()])
        );
        assert_eq!(config.data.dataset_path, PathBuf::from("Haircut_Dataset.csv"));
    }

    #[test]
    #[traced_test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 5001);
        assert!(logs_contain("using defaults"));
        assert!(!logs_contain("Configuration loaded from"));
    }

    #[test]
    #[traced_test]
    fn existing_file_is_reported_as_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(logs_contain("Configuration loaded from"));
        assert!(!logs_contain("using defaults"));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(AppError::Configuration { .. })
        ));
    }
}
