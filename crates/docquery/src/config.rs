//! Configuration for the document query client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable overriding `backend.base_url`
pub const ENV_BACKEND_URL: &str = "DOCQUERY_BACKEND_URL";
/// Environment variable overriding `backend.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "DOCQUERY_TIMEOUT_SECS";
/// Environment variable providing `recipes.api_key`
pub const ENV_SPOONACULAR_KEY: &str = "SPOONACULAR_API_KEY";
/// Environment variable overriding `recipes.base_url`
pub const ENV_SPOONACULAR_URL: &str = "SPOONACULAR_BASE_URL";

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document backend connection
    #[serde(default)]
    pub backend: BackendConfig,
    /// Orchestrator policies
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Recipe API configuration
    #[serde(default)]
    pub recipes: RecipeConfig,
}

/// Document backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL (no trailing slash needed)
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Request timeout in seconds, 0 disables the timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    300 // indexing a large PDF on the backend is slow
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Timeout to apply to every request, if any
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// What happens to the displayed answer when a query fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerPolicy {
    /// Leave the last good answer displayed
    #[default]
    Keep,
    /// Drop the last answer
    Clear,
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Answer handling on query failure
    #[serde(default)]
    pub on_query_failure: AnswerPolicy,
    /// Adopt a previously uploaded file when the shell starts (one-shot
    /// queries always look it up)
    #[serde(default = "default_restore_on_startup")]
    pub restore_on_startup: bool,
}

fn default_restore_on_startup() -> bool {
    true
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            on_query_failure: AnswerPolicy::Keep,
            restore_on_startup: true,
        }
    }
}

/// Recipe API (Spoonacular) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// API base URL
    #[serde(default = "default_recipes_url")]
    pub base_url: String,
    /// API key, usually supplied through the environment
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum ingredients before a lookup is attempted
    #[serde(default = "default_min_ingredients")]
    pub min_ingredients: usize,
    /// Search ranking: 1 maximises used ingredients, 2 minimises missing ones
    #[serde(default = "default_ranking")]
    pub ranking: u8,
    /// Request timeout in seconds
    #[serde(default = "default_recipes_timeout")]
    pub timeout_secs: u64,
}

fn default_recipes_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_min_ingredients() -> usize {
    2
}

fn default_ranking() -> u8 {
    2
}

fn default_recipes_timeout() -> u64 {
    30
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            base_url: default_recipes_url(),
            api_key: None,
            min_ingredients: default_min_ingredients(),
            ranking: default_ranking(),
            timeout_secs: default_recipes_timeout(),
        }
    }
}

impl AppConfig {
    /// Default config file location (`~/.config/docquery/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docquery").join("config.toml"))
    }

    /// Load configuration from an explicit file, the default location, or defaults,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            tracing::info!("{} set, using backend {}", ENV_BACKEND_URL, url);
            self.backend.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.backend.timeout_secs = secs.trim().parse().map_err(|e| {
                Error::Config(format!("Invalid {} value '{}': {}", ENV_TIMEOUT_SECS, secs, e))
            })?;
        }
        if let Some(key) = lookup(ENV_SPOONACULAR_KEY).filter(|k| !k.trim().is_empty()) {
            self.recipes.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(ENV_SPOONACULAR_URL) {
            self.recipes.base_url = url;
        }
        Ok(())
    }

    /// Check URLs and limits
    pub fn validate(&self) -> Result<()> {
        check_url("backend.base_url", &self.backend.base_url)?;
        check_url("recipes.base_url", &self.recipes.base_url)?;
        if self.recipes.min_ingredients == 0 {
            return Err(Error::Config(
                "recipes.min_ingredients must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", field, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "Invalid {} '{}': unsupported scheme {}",
            field, value, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.workflow.on_query_failure, AnswerPolicy::Keep);
        assert!(config.workflow.restore_on_startup);
        assert_eq!(config.recipes.min_ingredients, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_matches_defaults() {
        let parsed = AppConfig::from_toml("[recipes]\n").unwrap().recipes;
        let default = RecipeConfig::default();
        assert_eq!(parsed.min_ingredients, default.min_ingredients);
        assert_eq!(parsed.ranking, default.ranking);
        assert_eq!(parsed.timeout_secs, default.timeout_secs);
        assert_eq!(parsed.base_url, default.base_url);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [backend]
            base_url = "https://pdf-api.example.com"

            [workflow]
            on_query_failure = "clear"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://pdf-api.example.com");
        assert_eq!(config.backend.timeout_secs, 300);
        assert_eq!(config.workflow.on_query_failure, AnswerPolicy::Clear);
        assert!(config.workflow.restore_on_startup);
        assert_eq!(config.recipes.ranking, 2);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "http://10.0.0.5:8000"),
            (ENV_TIMEOUT_SECS, " 45 "),
            (ENV_SPOONACULAR_KEY, "abc123"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.recipes.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bad_timeout_env_is_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = AppConfig::default();
        config.backend.base_url = "localhost:5000/api".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.backend.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let backend = BackendConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(backend.timeout(), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[recipes]\nmin_ingredients = 3\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.recipes.min_ingredients, 3);

        let missing = AppConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
