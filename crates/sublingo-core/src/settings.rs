//! Persisted client settings: the active provider, the AI/free toggle, and
//! the last-used API key per provider, stored as versioned TOML under the
//! user config directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::providers::Provider;

pub const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u32,
    pub provider: String,
    pub use_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            provider: Provider::Groq.as_str().to_string(),
            use_ai: true,
            updated_at: None,
            api_keys: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn provider(&self) -> Provider {
        Provider::parse(&self.provider).unwrap_or_default()
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider.as_str().to_string();
    }

    pub fn key_for(&self, provider: Provider) -> &str {
        self.api_keys
            .get(provider.as_str())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Key for the currently active provider.
    pub fn active_key(&self) -> &str {
        self.key_for(self.provider())
    }

    /// Stores or clears (empty value) the key for a provider.
    pub fn set_key(&mut self, provider: Provider, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.api_keys.remove(provider.as_str());
        } else {
            self.api_keys
                .insert(provider.as_str().to_string(), key.to_string());
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not resolve home directory for settings path")]
    HomeDirectoryUnavailable,
    #[error("failed to read settings at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write settings at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(toml::ser::Error),
    #[error("invalid settings: {message}")]
    Validation { message: String },
}

pub fn resolve_settings_path() -> Result<PathBuf, SettingsError> {
    let base_dirs = BaseDirs::new().ok_or(SettingsError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("sublingo")
        .join("settings.toml"))
}

/// Loads the settings file. A missing file is not an error; a fresh
/// install simply runs with defaults.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: Settings = toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_settings(&parsed)?;
    Ok(parsed)
}

/// Writes the settings atomically (temp file, then rename) and stamps
/// `updated_at`.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    validate_settings(settings)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut stamped = settings.clone();
    stamped.updated_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();

    let serialized = toml::to_string(&stamped).map_err(SettingsError::Serialize)?;
    let temp_path = path.with_extension("toml.tmp");

    fs::write(&temp_path, serialized).map_err(|source| SettingsError::Write {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.version != SETTINGS_VERSION {
        return Err(SettingsError::Validation {
            message: format!(
                "unsupported version (expected {SETTINGS_VERSION}, found {})",
                settings.version
            ),
        });
    }

    if Provider::parse(&settings.provider).is_err() {
        return Err(SettingsError::Validation {
            message: format!("unknown provider '{}'", settings.provider),
        });
    }

    for name in settings.api_keys.keys() {
        if Provider::parse(name).is_err() {
            return Err(SettingsError::Validation {
                message: format!("api_keys contains unknown provider '{name}'"),
            });
        }
    }

    Ok(())
}
