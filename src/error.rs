use thiserror::Error;

use crate::host::PlayerId;

/// Errors raised while reading, validating or writing plugin settings.
///
/// Load-time variants never escape [`crate::config::ConfigManager::load_or_default`];
/// they are carried as the cause of a recovered load.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Wrapper around IO errors (reading the settings file, writing it or its backup).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid UTF-8.
    #[error("settings file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The settings payload is not valid JSON or has the wrong shape.
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// The settings parsed but were never written by the versioned writer.
    #[error("settings file has no ConfigVersion marker")]
    MissingVersion,
}

/// Errors that abort a single hook dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A message key was requested that is registered for neither the player's locale
    /// nor the default locale.
    #[error("no localized message registered for '{key}' (player {player})")]
    MissingLocalizationKey { key: String, player: PlayerId },

    /// A registered template could not be formatted with the supplied arguments.
    #[error("bad template for '{key}': {reason}")]
    Template { key: String, reason: String },
}

/// Errors from loading or replaying a scenario file.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// An event or registry snapshot names a player the scenario never declared.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
