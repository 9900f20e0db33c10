//! Compiler configuration types

use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid temporal binding '{0}': expected Stored=Provider/method")]
    InvalidBinding(String),
}

/// How one temporal kind is stored by generated code.
///
/// Written as `Stored=Provider/method`: values arrive as `Provider` and are
/// converted to `Stored` by calling `method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemporalBinding {
    pub stored: String,
    pub provider: String,
    pub method: String,
}

impl FromStr for TemporalBinding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBinding(s.to_string());
        let (stored, rest) = s.split_once('=').ok_or_else(invalid)?;
        let (provider, method) = rest.rsplit_once('/').ok_or_else(invalid)?;
        if stored.is_empty() || provider.is_empty() || method.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            stored: stored.trim().to_string(),
            provider: provider.trim().to_string(),
            method: method.trim().to_string(),
        })
    }
}

impl TryFrom<String> for TemporalBinding {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TemporalBinding> for String {
    fn from(binding: TemporalBinding) -> Self {
        binding.to_string()
    }
}

impl fmt::Display for TemporalBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}/{}", self.stored, self.provider, self.method)
    }
}

/// Stored representations for the date, time and datetime kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalBindings {
    #[serde(default = "default_date_binding")]
    pub date: TemporalBinding,

    #[serde(default = "default_time_binding")]
    pub time: TemporalBinding,

    #[serde(default = "default_datetime_binding")]
    pub datetime: TemporalBinding,
}

fn binding(stored: &str, provider: &str, method: &str) -> TemporalBinding {
    TemporalBinding {
        stored: stored.to_string(),
        provider: provider.to_string(),
        method: method.to_string(),
    }
}

fn default_date_binding() -> TemporalBinding {
    binding(
        "javax.time.calendar.LocalDate",
        "javax.time.calendar.DateProvider",
        "toLocalDate",
    )
}

fn default_time_binding() -> TemporalBinding {
    binding(
        "javax.time.calendar.LocalTime",
        "javax.time.calendar.TimeProvider",
        "toLocalTime",
    )
}

fn default_datetime_binding() -> TemporalBinding {
    binding(
        "javax.time.calendar.LocalDateTime",
        "javax.time.calendar.DateTimeProvider",
        "toLocalDateTime",
    )
}

impl Default for TemporalBindings {
    fn default() -> Self {
        Self {
            date: default_date_binding(),
            time: default_time_binding(),
            datetime: default_datetime_binding(),
        }
    }
}

/// Configuration for one compilation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Generate context-threading codecs for every message, not only those
    /// that reach an external message
    #[serde(default)]
    pub to_from_with_context: bool,

    /// Stored representation of temporal fields
    #[serde(default)]
    pub temporal: TemporalBindings,

    /// Backends to run (default: java)
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,

    /// Output root for generated files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Text placed at the top of every generated file
    #[serde(default)]
    pub file_header: Option<String>,

    /// Text placed at the end of every generated file
    #[serde(default)]
    pub file_footer: Option<String>,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Free-form backend options
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_backends() -> Vec<String> {
    vec!["java".to_string()]
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            to_from_with_context: false,
            temporal: TemporalBindings::default(),
            backends: default_backends(),
            output_dir: None,
            file_header: None,
            file_footer: None,
            log_level: default_log_level(),
            data: serde_json::Value::Null,
        }
    }
}

impl CompileConfig {
    /// Create a configuration with every key at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Create configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get a typed value from the free-form data table
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the free-form data table
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = serde_json::to_value(value)?;
        match &mut self.data {
            serde_json::Value::Object(map) => {
                map.insert(key.to_string(), value);
            }
            other => {
                let mut map = serde_json::Map::new();
                map.insert(key.to_string(), value);
                *other = serde_json::Value::Object(map);
            }
        }
        Ok(())
    }
}
