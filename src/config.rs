//! Application configuration loaded from JSON

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::data::RetentionTimeConfig;
use crate::error::{ProcalError, Result};
use crate::render::Theme;
use crate::session::SessionConfig;

/// Everything the `procal` binary can be configured with.
///
/// Missing keys take their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: RetentionTimeConfig,
    pub session: SessionConfig,
    /// `default` or `slides`
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: RetentionTimeConfig::default(),
            session: SessionConfig::default(),
            theme: "default".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProcalError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ProcalError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.resolve_theme()?.validate()
    }

    pub fn resolve_theme(&self) -> Result<Theme> {
        Theme::by_name(&self.theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.data.n_test, 15);
        assert_eq!(config.data.random_state, 42);
        assert_eq!(config.session.grid_points, 1000);
        assert_eq!(config.theme, "default");
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{"data": {"n_test": 5, "replicate_stem": "R2"}, "theme": "slides"}"#;
        let config = AppConfig::from_json_str(json).unwrap();
        assert_eq!(config.data.n_test, 5);
        assert_eq!(config.data.replicate_stem, "R2");
        assert_eq!(config.data.target_column, "Peptide Retention Time");
        assert_eq!(config.resolve_theme().unwrap().name, "slides");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            AppConfig::from_json_str(r#"{"theme": "neon"}"#),
            Err(ProcalError::ConfigError(_))
        ));
        assert!(AppConfig::from_json_str("not json").is_err());
        assert!(AppConfig::from_json_str(r#"{"session": {"grid_points": 0}}"#)
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"session": {{"grid_points": 200}}}}"#).unwrap();
        let config = AppConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.session.grid_points, 200);
    }
}
