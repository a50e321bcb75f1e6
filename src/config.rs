//! Run configuration for the transcription engine.
//!
//! All engine parameters are fixed for the whole run: one [`EngineConfig`] is
//! built at process start (config file, then CLI overrides) and shared
//! read-only by every job. Flag semantics are not interpreted here; the engine
//! validates them itself at invocation time.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Language forwarded to the engine: an explicit tag, or engine-side detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    /// Let the engine detect the spoken language.
    #[default]
    Auto,
    /// A fixed language tag such as `en` or `pt`.
    Tag(String),
}

impl Language {
    /// Parse from a CLI or config value; `auto` (any case) selects detection.
    pub fn from_arg(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("auto") {
            Language::Auto
        } else {
            Language::Tag(s.trim().to_string())
        }
    }

    /// The value passed on the engine command line.
    pub fn as_str(&self) -> &str {
        match self {
            Language::Auto => "auto",
            Language::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Language::from_arg(&value))
    }
}

/// Engine parameters for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable to spawn.
    pub program: String,
    /// Model identifier forwarded to the engine.
    pub model: String,
    /// Language tag, or engine-side auto-detection.
    pub language: Language,
    /// Output format the engine should produce (txt, srt, vtt, ...).
    pub output_format: String,
    /// Transcript directory; `None` means next to the inputs.
    pub output_dir: Option<PathBuf>,
    /// Extra `(flag, value)` pairs forwarded to the engine in order,
    /// after the standard arguments. Semantics belong to the engine.
    pub extra_args: Vec<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "whisper".to_string(),
            model: "medium".to_string(),
            language: Language::Auto,
            output_format: "txt".to_string(),
            output_dir: None,
            extra_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "batchscribe", "batchscribe")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load config from file, or fall back to defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = Self::config_path() else {
            debug!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Validation("engine program is empty".into()));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model name is empty".into()));
        }

        // Model and format land in file names and command lines; reject
        // path traversal early.
        if self.model.contains("..") || self.model.contains('/') || self.model.contains('\\') {
            return Err(ConfigError::Validation(
                "model name contains invalid characters".into(),
            ));
        }

        if self.output_format.trim().is_empty() {
            return Err(ConfigError::Validation("output format is empty".into()));
        }

        if self.output_format.contains('.')
            || self.output_format.contains('/')
            || self.output_format.contains('\\')
        {
            return Err(ConfigError::Validation(
                "output format must be a bare extension".into(),
            ));
        }

        Ok(())
    }

    /// Directory transcripts are written to for a run over `input_dir`.
    pub fn output_dir_for(&self, input_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| input_dir.to_path_buf())
    }

    /// Expected artifact path for `input`: `<output_dir>/<stem>.<format>`.
    ///
    /// A pure function of the input path and this configuration; the
    /// idempotency check and failure cleanup both key on it.
    pub fn expected_output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .unwrap_or_else(|| input.as_os_str())
            .to_string_lossy();
        output_dir.join(format!("{}.{}", stem, self.output_format))
    }
}
