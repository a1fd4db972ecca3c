//! # Host Collaborators
//!
//! The game server owns players, cupboards, permissions, localization and chat. This
//! module describes the slice of that surface the plugin consumes:
//!
//! - [`Player`] / [`PlayerId`] - the acting player of a hook
//! - [`CupboardSnapshot`] - read-only view of one cupboard's authorization list
//! - [`PermissionRegistry`] - named grants per player
//! - [`LocalizationCatalog`] - per-locale message templates keyed by plugin and key
//! - [`ChatSink`] - fire-and-forget chat delivery
//!
//! [`memory`] provides in-process implementations used by the replay harness and tests.

pub mod memory;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Steam-style numeric player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected player as handed to a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
        }
    }
}

/// One entry of a cupboard's authorization list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedPlayer {
    pub user_id: PlayerId,
    pub username: String,
}

impl AuthorizedPlayer {
    pub fn new(user_id: u64, username: impl Into<String>) -> Self {
        Self {
            user_id: PlayerId(user_id),
            username: username.into(),
        }
    }
}

/// The authorization list of a single cupboard at the moment a hook fires.
///
/// Entries keep the host's insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CupboardSnapshot {
    entries: Vec<AuthorizedPlayer>,
}

impl CupboardSnapshot {
    pub fn new(entries: Vec<AuthorizedPlayer>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AuthorizedPlayer] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<AuthorizedPlayer> for CupboardSnapshot {
    fn from_iter<I: IntoIterator<Item = AuthorizedPlayer>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Host permission system.
pub trait PermissionRegistry {
    /// Declare a permission owned by `owner` so operators can grant it.
    fn register_permission(&mut self, name: &str, owner: &str);

    fn has_permission(&self, player: PlayerId, name: &str) -> bool;
}

/// Host localization system.
pub trait LocalizationCatalog {
    /// Register default templates for `owner` in `locale`. Keys that already exist for
    /// that locale are left untouched.
    fn register_messages(&mut self, owner: &str, locale: &str, messages: &BTreeMap<&str, &str>);

    /// Resolve the template for `key` in the player's locale, if any is registered.
    fn get_template(&self, owner: &str, key: &str, player: PlayerId) -> Option<String>;
}

/// Host chat output.
pub trait ChatSink {
    fn send_message(&mut self, player: &Player, text: &str);
}

/// The collaborators a hook needs at dispatch time.
pub struct HostServices<'a> {
    pub permissions: &'a dyn PermissionRegistry,
    pub lang: &'a dyn LocalizationCatalog,
    pub chat: &'a mut dyn ChatSink,
}
