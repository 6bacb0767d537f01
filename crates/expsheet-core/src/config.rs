use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ExpsheetError;
use crate::export::{DEFAULT_FILE_NAME, DEFAULT_SHEET_NAME};

/// Top-level configuration, usually read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub summarizer: SummarizerConfig,
    pub export: ExportConfig,
}

/// Settings for the chat-completions client.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, without `/chat/completions`.
    pub base_url: String,
    pub model: String,
    /// Document text beyond this many characters is cut before sending.
    pub max_content_length: usize,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub file_name: String,
    pub sheet_name: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-2024-08-06".to_string(),
            max_content_length: 40_000,
            timeout_secs: 120,
            temperature: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("SummarizerConfig")
            .field("api_key", &key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_content_length", &self.max_content_length)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings needed to make a request.
    pub fn validate(&self) -> Result<(), ExpsheetError> {
        if self.api_key.trim().is_empty() {
            return Err(ExpsheetError::Config(
                "missing API key (set OPENAI_API_KEY or summarizer.api_key)".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ExpsheetError::Config("model must not be empty".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ExpsheetError::Config(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.max_content_length == 0 {
            return Err(ExpsheetError::Config(
                "max_content_length must be greater than zero".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ExpsheetError::Config(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ExpsheetError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExpsheetError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| ExpsheetError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ExpsheetError> {
        toml::from_str(content).map_err(|e| ExpsheetError::Config(e.to_string()))
    }
}
