//! Configuration management

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default analyzer server address
pub const DEFAULT_ANALYZER_ADDRESS: &str = "127.0.0.1:7700";

/// Global configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub analysis: AnalysisConfig,
}

/// How to reach the external analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    /// Persistent server on a TCP or unix socket
    Socket,
    /// Fresh process per request
    Subprocess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub mode: AnalyzerMode,
    /// `host:port`, or a socket path on unix
    pub address: String,
    /// Argv of the one-shot analyzer
    pub command: Vec<String>,
}

/// Editor events that can trigger re-analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorEvent {
    Load,
    Save,
    Activated,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Events after which a buffer is re-analyzed
    pub analyze_on: Vec<EditorEvent>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            mode: AnalyzerMode::Socket,
            address: DEFAULT_ANALYZER_ADDRESS.to_string(),
            command: vec![],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyze_on: vec![EditorEvent::Load, EditorEvent::Save, EditorEvent::Activated],
        }
    }
}

impl AnalysisConfig {
    pub fn triggers_on(&self, event: EditorEvent) -> bool {
        self.analyze_on.contains(&event)
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(std::env::var("KONDEX_ANALYZER_ADDRESS").ok());
        Ok(config)
    }

    /// Load from a specific file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, address: Option<String>) {
        if let Some(address) = address.filter(|a| !a.is_empty()) {
            self.analyzer.address = address;
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::kondex_home()?.join("config.toml"))
    }

    /// Get the kondex home directory
    pub fn kondex_home() -> Result<PathBuf> {
        // Check KONDEX_HOME env var first
        if let Ok(home) = std::env::var("KONDEX_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "kondex", "kondex")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::Config {
                message: "Could not determine kondex home directory".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.analysis.triggers_on(EditorEvent::Save));
        assert!(!config.analysis.triggers_on(EditorEvent::Modified));
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[analyzer]
mode = "subprocess"
command = ["clj-kondo-line", "--stdin"]

[analysis]
analyze_on = ["save", "modified"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.analyzer.mode, AnalyzerMode::Subprocess);
        assert_eq!(config.analyzer.address, DEFAULT_ANALYZER_ADDRESS);
        assert_eq!(config.analyzer.command.len(), 2);
        assert!(config.analysis.triggers_on(EditorEvent::Modified));
        assert!(!config.analysis.triggers_on(EditorEvent::Load));
    }

    #[test]
    fn test_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[analyzer\nmode = 1").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_address_override() {
        let mut config = Config::default();
        config.apply_overrides(Some(String::new()));
        assert_eq!(config.analyzer.address, DEFAULT_ANALYZER_ADDRESS);

        config.apply_overrides(Some("/tmp/analyzer.sock".to_string()));
        assert_eq!(config.analyzer.address, "/tmp/analyzer.sock");
    }
}
