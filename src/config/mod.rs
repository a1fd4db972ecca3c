//! # Configuration Management Module
//!
//! Loads, validates, recovers and persists the plugin [`Settings`].
//!
//! ## Load sequence
//!
//! Every plugin load runs [`ConfigManager::load_and_persist`]:
//!
//! 1. Read the settings file through a [`ConfigStore`].
//! 2. Decode it as UTF-8 (a leading byte order mark is skipped), parse it and require
//!    the `ConfigVersion` marker.
//! 3. On any failure, log a warning, copy the raw bytes to the `.error` sibling and
//!    fall back to [`Settings::default`].
//! 4. Write the resulting settings back so defaults and completed fields are visible to
//!    the operator straight away.
//!
//! Loading never fails; [`LoadOutcome`] records which branch was taken.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "Prefix": "[<color=yellow>Cupboard Info</color>]",
//!   "UsePermission": false,
//!   "ConfigVersion": "0.1.0"
//! }
//! ```
//!
//! In a versioned file, a missing or `null` `Prefix` / `UsePermission` is filled from
//! the defaults. A file with no `ConfigVersion` predates the versioned writer and is
//! treated as corrupt.

pub mod store;

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub use store::{ConfigStore, ConfigTarget, FileConfigStore};

use crate::error::ConfigError;
use crate::logutil::preview;

/// Version tag stamped into settings written by this build.
pub const CONFIG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix shown in front of every header message unless the operator changes it.
pub const DEFAULT_PREFIX: &str = "[<color=yellow>Cupboard Info</color>]";

/// User-editable plugin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Text prepended to every header message; may contain rich-text markup.
    #[serde(
        rename = "Prefix",
        default = "default_prefix",
        deserialize_with = "prefix_or_default"
    )]
    pub prefix: String,
    /// When true, only players holding the use permission receive notices.
    #[serde(
        rename = "UsePermission",
        default,
        deserialize_with = "flag_or_default"
    )]
    pub permission_gated: bool,
    /// Present once the file has been written by the versioned writer.
    #[serde(
        rename = "ConfigVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_version: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn prefix_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_prefix))
}

fn flag_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            prefix: default_prefix(),
            permission_gated: false,
            schema_version: Some(CONFIG_VERSION.to_string()),
        }
    }
}

impl Settings {
    /// Parse a settings payload and require the version marker. A leading byte order
    /// mark is ignored.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.strip_prefix('\u{FEFF}').unwrap_or(raw);
        let settings: Settings = serde_json::from_str(raw)?;
        match settings.schema_version.as_deref() {
            Some(v) if !v.trim().is_empty() => Ok(settings),
            _ => Err(ConfigError::MissingVersion),
        }
    }

    /// Canonical on-disk form.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a settings load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The settings file parsed and carried a version marker.
    Loaded(Settings),
    /// No settings file existed; defaults were used.
    Created(Settings),
    /// The settings file could not be used. `backup` names the `.error` copy of its raw
    /// content when one could be written.
    Recovered {
        settings: Settings,
        backup: Option<PathBuf>,
        cause: ConfigError,
    },
}

impl LoadOutcome {
    pub fn settings(&self) -> &Settings {
        match self {
            LoadOutcome::Loaded(s) | LoadOutcome::Created(s) => s,
            LoadOutcome::Recovered { settings, .. } => settings,
        }
    }

    pub fn into_settings(self) -> Settings {
        match self {
            LoadOutcome::Loaded(s) | LoadOutcome::Created(s) => s,
            LoadOutcome::Recovered { settings, .. } => settings,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }

    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            LoadOutcome::Recovered { backup, .. } => backup.as_deref(),
            _ => None,
        }
    }
}

/// Owns the settings store of one plugin.
#[derive(Debug)]
pub struct ConfigManager<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> ConfigManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The hard-coded baseline settings.
    pub fn default_settings() -> Settings {
        Settings::default()
    }

    /// Read and validate the persisted settings, recovering to defaults on any failure.
    pub fn load_or_default(&self) -> LoadOutcome {
        let path = self.store.path_for(ConfigTarget::Primary);
        let raw = match self.store.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!("Loading default config ({} not found)", path.display());
                return LoadOutcome::Created(Self::default_settings());
            }
            Err(e) => {
                warn!(
                    "Failed to read config {}: {}; using defaults",
                    path.display(),
                    e
                );
                return LoadOutcome::Recovered {
                    settings: Self::default_settings(),
                    backup: None,
                    cause: ConfigError::Io(e),
                };
            }
        };

        let text = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => {
                let raw = e.as_bytes().to_vec();
                return self.recover(&raw, ConfigError::Encoding(e));
            }
        };

        match Settings::from_json(&text) {
            Ok(settings) => {
                if settings.schema_version.as_deref() != Some(CONFIG_VERSION) {
                    debug!(
                        "Config {} written by version {:?}, current is {}",
                        path.display(),
                        settings.schema_version,
                        CONFIG_VERSION
                    );
                }
                LoadOutcome::Loaded(settings)
            }
            Err(cause) => self.recover(text.as_bytes(), cause),
        }
    }

    /// Copy the raw bytes to the backup target and fall back to defaults.
    fn recover(&self, raw: &[u8], cause: ConfigError) -> LoadOutcome {
        let backup = match self.store.write_raw(raw, ConfigTarget::Backup) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(
                    "Could not write config backup {}: {}",
                    self.store.path_for(ConfigTarget::Backup).display(),
                    e
                );
                None
            }
        };
        warn!(
            "Config {} is invalid ({}); saved original to {} and loaded defaults. Content: {}",
            self.store.path_for(ConfigTarget::Primary).display(),
            cause,
            backup
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<no backup>".to_string()),
            preview(&String::from_utf8_lossy(raw))
        );
        LoadOutcome::Recovered {
            settings: Self::default_settings(),
            backup,
            cause,
        }
    }

    /// Write `settings` to the live settings file in canonical form.
    pub fn persist(&self, settings: &Settings) -> Result<(), ConfigError> {
        let raw = settings.to_json()?;
        let path = self.store.write_raw(raw.as_bytes(), ConfigTarget::Primary)?;
        debug!("Wrote config {}", path.display());
        Ok(())
    }

    /// Plugin-load sequence: load (recovering if needed), then write the result back.
    pub fn load_and_persist(&self) -> LoadOutcome {
        let outcome = self.load_or_default();
        match self.persist(outcome.settings()) {
            Ok(()) => info!(
                "Config ready (prefix={:?}, permission gated={})",
                outcome.settings().prefix,
                outcome.settings().permission_gated
            ),
            Err(e) => warn!("Failed to save config: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.prefix, "[<color=yellow>Cupboard Info</color>]");
        assert!(!settings.permission_gated);
        assert_eq!(settings.schema_version.as_deref(), Some(CONFIG_VERSION));
        assert_eq!(ConfigManager::<FileConfigStore>::default_settings(), settings);
    }

    #[test]
    fn test_settings_serde_field_names() {
        let serialized = Settings::default().to_json().unwrap();
        assert!(serialized.contains("\"Prefix\""));
        assert!(serialized.contains("\"UsePermission\": false"));
        assert!(serialized.contains(&format!("\"ConfigVersion\": \"{}\"", CONFIG_VERSION)));

        let parsed = Settings::from_json(&serialized).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let parsed = Settings::from_json(r#"{"ConfigVersion": "0.0.1", "Prefix": null}"#).unwrap();
        assert_eq!(parsed.prefix, DEFAULT_PREFIX);
        assert!(!parsed.permission_gated);
        assert_eq!(parsed.schema_version.as_deref(), Some("0.0.1"));

        let parsed =
            Settings::from_json(r#"{"ConfigVersion": "0.0.1", "UsePermission": true}"#).unwrap();
        assert_eq!(parsed.prefix, DEFAULT_PREFIX);
        assert!(parsed.permission_gated);
    }

    #[test]
    fn test_unversioned_settings_rejected() {
        let legacy = r#"{"Prefix": "[Legacy]", "UsePermission": true}"#;
        assert!(matches!(
            Settings::from_json(legacy),
            Err(ConfigError::MissingVersion)
        ));

        let blank = r#"{"Prefix": "[x]", "ConfigVersion": "  "}"#;
        assert!(matches!(
            Settings::from_json(blank),
            Err(ConfigError::MissingVersion)
        ));
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let body = r#"{"Prefix": "[Mine]", "UsePermission": true, "ConfigVersion": "0.1.0"}"#;
        let parsed = Settings::from_json(&format!("\u{FEFF}{}", body)).unwrap();
        assert_eq!(parsed.prefix, "[Mine]");
        assert!(parsed.permission_gated);

        // Only a leading mark is tolerated
        assert!(matches!(
            Settings::from_json(&format!("{}\u{FEFF}", body)),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        for raw in [
            "",
            "not json",
            "[1, 2, 3]",
            r#"{"Prefix": 5, "ConfigVersion": "1"}"#,
            r#"{"UsePermission": "yes", "ConfigVersion": "1"}"#,
        ] {
            assert!(
                matches!(Settings::from_json(raw), Err(ConfigError::Parse(_))),
                "expected parse error for {:?}",
                raw
            );
        }
    }
}
