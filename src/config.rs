//! Repository configuration
//!
//! Stored as JSON in `<repo>/.cairn/config.json`. The author identity may
//! also come from `CAIRN_AUTHOR_NAME` / `CAIRN_AUTHOR_EMAIL`, which take
//! precedence over the file.

use crate::model::Author;
use crate::store::compress::DEFAULT_LEVEL;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const AUTHOR_NAME_VAR: &str = "CAIRN_AUTHOR_NAME";
pub const AUTHOR_EMAIL_VAR: &str = "CAIRN_AUTHOR_EMAIL";

/// Per-repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default identity for new commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// zstd level for new objects
    #[serde(default = "default_level")]
    pub compression_level: i32,
}

fn default_level() -> i32 {
    DEFAULT_LEVEL
}

impl Default for Config {
    fn default() -> Self {
        Config {
            author: None,
            compression_level: DEFAULT_LEVEL,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Resolve the commit author from the process environment and this config
    pub fn author(&self) -> Result<Author> {
        self.author_with(|key| std::env::var(key).ok())
    }

    /// Resolve the commit author using `lookup` in place of the environment
    pub fn author_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Author> {
        let from_file = self.author.as_ref();
        let name = lookup(AUTHOR_NAME_VAR).or_else(|| from_file.map(|a| a.name.clone()));
        let email = lookup(AUTHOR_EMAIL_VAR).or_else(|| from_file.map(|a| a.email.clone()));

        match (name, email) {
            (Some(name), Some(email)) => Author::new(name, email)
                .map_err(|e| Error::Config(format!("Invalid author identity: {}", e))),
            _ => Err(Error::Config(format!(
                "No author identity: set {} and {} or add \"author\" to config.json",
                AUTHOR_NAME_VAR, AUTHOR_EMAIL_VAR
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.compression_level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            author: Some(Author::new("Ada", "ada@example.com").unwrap()),
            compression_level: 5,
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_default_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"author":{"name":"Ada","email":"a@b"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.compression_level, DEFAULT_LEVEL);
        assert_eq!(config.author.unwrap().name, "Ada");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config {
            author: Some(Author::new("File", "file@example.com").unwrap()),
            ..Config::default()
        };
        let author = config
            .author_with(env(&[(AUTHOR_NAME_VAR, "Env")]))
            .unwrap();
        assert_eq!(author.name, "Env");
        assert_eq!(author.email, "file@example.com");
    }

    #[test]
    fn test_missing_identity() {
        let err = Config::default().author_with(env(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_identity_from_env() {
        let err = Config::default()
            .author_with(env(&[(AUTHOR_NAME_VAR, "<bad>"), (AUTHOR_EMAIL_VAR, "x")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
