//! Project configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::report::ExecutorInfo;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Test case store (JSON document)
    #[serde(default = "default_store")]
    pub store: PathBuf,

    /// Directory receiving one sub-directory per run
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Title of the HTML preview
    #[serde(default = "default_report_title")]
    pub report_title: String,

    /// Mask secrets in exported `.http` files
    #[serde(default = "default_true")]
    pub mask_headers: bool,

    /// Allure `executor.json` metadata
    #[serde(default)]
    pub executor: ExecutorInfo,
}

fn default_store() -> PathBuf {
    PathBuf::from(".apicase/test-cases.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".apicase/reports")
}

fn default_report_title() -> String {
    "API Test Report".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: default_store(),
            output_dir: default_output_dir(),
            report_title: default_report_title(),
            mask_headers: true,
            executor: ExecutorInfo::default(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apicase.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".apicase.toml", ".apicase.json", "apicase.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Create example config file
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apicase configuration

# Test case store (JSON document, key "testCases")
store = ".apicase/test-cases.json"

# Reports: one sub-directory per run
output_dir = ".apicase/reports"

# Title of the HTML preview
report_title = "API Test Report"

# Mask Authorization / API key values in exported .http files
mask_headers = true

# Allure executor.json metadata (all optional)
[executor]
name = "apicase"
# build_order = 1
# report_name = "Nightly API Tests"
# report_url = "https://ci.example.com/reports/1"
# build_url = "https://ci.example.com/builds/1"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
