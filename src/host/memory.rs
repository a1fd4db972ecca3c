//! In-process host collaborators.
//!
//! These back the `replay` harness and the test suite. They follow the host's rules
//! closely enough to exercise the plugin: grants require a registered permission,
//! message registration never clobbers existing templates, and lookups fall back to
//! the server default locale.

use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{ChatSink, LocalizationCatalog, PermissionRegistry, Player, PlayerId};
use crate::lang::DEFAULT_LOCALE;
use crate::logutil::preview;

#[derive(Debug, Default)]
pub struct MemoryPermissions {
    registered: BTreeMap<String, String>,
    grants: HashMap<PlayerId, HashSet<String>>,
}

impl MemoryPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Grant `name` to `player`. Returns false when the permission was never registered.
    pub fn grant(&mut self, player: PlayerId, name: &str) -> bool {
        if !self.is_registered(name) {
            warn!("Cannot grant unregistered permission '{}' to {}", name, player);
            return false;
        }
        self.grants
            .entry(player)
            .or_default()
            .insert(name.to_string());
        true
    }

    pub fn revoke(&mut self, player: PlayerId, name: &str) {
        if let Some(set) = self.grants.get_mut(&player) {
            set.remove(name);
        }
    }
}

impl PermissionRegistry for MemoryPermissions {
    fn register_permission(&mut self, name: &str, owner: &str) {
        if let Some(existing) = self.registered.get(name) {
            if existing != owner {
                warn!(
                    "Permission '{}' already registered by {}; ignoring {}",
                    name, existing, owner
                );
            }
            return;
        }
        debug!("Registered permission '{}' for {}", name, owner);
        self.registered.insert(name.to_string(), owner.to_string());
    }

    fn has_permission(&self, player: PlayerId, name: &str) -> bool {
        self.grants
            .get(&player)
            .map(|set| set.contains(name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    // (owner, locale) -> key -> template
    messages: HashMap<(String, String), BTreeMap<String, String>>,
    player_locales: HashMap<PlayerId, String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_player_locale(&mut self, player: PlayerId, locale: impl Into<String>) {
        self.player_locales.insert(player, locale.into());
    }

    pub fn locale_of(&self, player: PlayerId) -> &str {
        self.player_locales
            .get(&player)
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOCALE)
    }

    /// Overwrite a single template, the way an operator edits a lang file.
    pub fn set_message(&mut self, owner: &str, locale: &str, key: &str, template: &str) {
        self.messages
            .entry((owner.to_string(), locale.to_string()))
            .or_default()
            .insert(key.to_string(), template.to_string());
    }

    fn lookup(&self, owner: &str, locale: &str, key: &str) -> Option<&String> {
        self.messages
            .get(&(owner.to_string(), locale.to_string()))
            .and_then(|table| table.get(key))
    }
}

impl LocalizationCatalog for MemoryCatalog {
    fn register_messages(&mut self, owner: &str, locale: &str, messages: &BTreeMap<&str, &str>) {
        let table = self
            .messages
            .entry((owner.to_string(), locale.to_string()))
            .or_default();
        for (key, template) in messages {
            table
                .entry((*key).to_string())
                .or_insert_with(|| (*template).to_string());
        }
    }

    fn get_template(&self, owner: &str, key: &str, player: PlayerId) -> Option<String> {
        let locale = self.locale_of(player);
        self.lookup(owner, locale, key)
            .or_else(|| self.lookup(owner, DEFAULT_LOCALE, key))
            .cloned()
    }
}

/// Records every chat line in send order.
#[derive(Debug, Default)]
pub struct ChatLog {
    sent: Vec<(PlayerId, String)>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[(PlayerId, String)] {
        &self.sent
    }

    pub fn messages_for(&self, player: PlayerId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl ChatSink for ChatLog {
    fn send_message(&mut self, player: &Player, text: &str) {
        debug!("chat -> {} ({}): {}", player.name, player.id, preview(text));
        self.sent.push((player.id, text.to_string()));
    }
}
