//! Scenario replay against the in-memory host.
//!
//! A scenario declares players (with locale and granted permissions), optional
//! per-locale message overrides and an ordered list of cupboard events. Replaying loads
//! the plugin with the given config store, fires each event and collects every chat
//! line in delivery order.
//!
//! ```toml
//! [[players]]
//! id = 42
//! name = "Alice"
//! permissions = ["cupboardinfo.use"]
//!
//! [[players]]
//! id = 7
//! name = "Bob"
//! locale = "fr"
//!
//! [messages.fr]
//! StillAuthorized = "Toujours autorisés :"
//!
//! [[events]]
//! kind = "authorized"
//! player = 42
//! authorized = [42, 7]
//! ```

use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::config::{ConfigStore, LoadOutcome};
use crate::dispatch::LifecycleEvent;
use crate::error::ReplayError;
use crate::host::memory::{ChatLog, MemoryCatalog, MemoryPermissions};
use crate::host::{AuthorizedPlayer, CupboardSnapshot, HostServices, Player, PlayerId};
use crate::plugin::{CupboardInfo, PLUGIN_NAME};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub players: Vec<ScenarioPlayer>,
    /// locale -> message key -> template
    #[serde(default)]
    pub messages: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlayer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Cleared,
    Authorized,
    Deauthorized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub kind: EventKind,
    pub player: u64,
    /// Cupboard authorization list at the time of the event, in order.
    #[serde(default)]
    pub authorized: Vec<u64>,
}

/// A chat line delivered during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: PlayerId,
    pub name: String,
    pub text: String,
}

#[derive(Debug)]
pub struct ReplayReport {
    pub config: LoadOutcome,
    pub deliveries: Vec<Delivery>,
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Load the plugin from `store`, apply the scenario to a fresh in-memory host and fire
/// its events in order.
pub fn replay<S: ConfigStore>(scenario: &Scenario, store: S) -> Result<ReplayReport, ReplayError> {
    let mut permissions = MemoryPermissions::new();
    let mut catalog = MemoryCatalog::new();
    let mut chat = ChatLog::new();

    let (plugin, config) = CupboardInfo::load(store, &mut permissions, &mut catalog);

    for (locale, table) in &scenario.messages {
        for (key, template) in table {
            catalog.set_message(PLUGIN_NAME, locale, key, template);
        }
    }

    let mut players: HashMap<PlayerId, Player> = HashMap::new();
    for p in &scenario.players {
        let player = Player::new(p.id, p.name.clone());
        if let Some(locale) = &p.locale {
            catalog.set_player_locale(player.id, locale.clone());
        }
        for perm in &p.permissions {
            if !permissions.grant(player.id, perm) {
                warn!("Scenario grant of '{}' to {} ignored", perm, player.name);
            }
        }
        players.insert(player.id, player);
    }

    let lookup = |id: u64| {
        players
            .get(&PlayerId(id))
            .ok_or(ReplayError::UnknownPlayer(PlayerId(id)))
    };

    for (n, ev) in scenario.events.iter().enumerate() {
        let player = lookup(ev.player)?;
        let cupboard = ev
            .authorized
            .iter()
            .map(|id| lookup(*id).map(|p| AuthorizedPlayer::new(p.id.0, p.name.clone())))
            .collect::<Result<CupboardSnapshot, _>>()?;

        let event = match ev.kind {
            EventKind::Cleared => LifecycleEvent::Cleared {
                cupboard: &cupboard,
                player,
            },
            EventKind::Authorized => LifecycleEvent::Authorized {
                cupboard: &cupboard,
                player,
            },
            EventKind::Deauthorized => LifecycleEvent::Deauthorized {
                cupboard: &cupboard,
                player,
            },
        };
        info!("event #{}: {} by {}", n + 1, event.hook_name(), player.name);

        let mut host = HostServices {
            permissions: &permissions,
            lang: &catalog,
            chat: &mut chat,
        };
        plugin.handle(&mut host, event)?;
    }

    let deliveries = chat
        .sent()
        .iter()
        .map(|(to, text)| Delivery {
            to: *to,
            name: players
                .get(to)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            text: text.clone(),
        })
        .collect();

    Ok(ReplayReport { config, deliveries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scenario() {
        let scenario = Scenario::from_toml(
            r#"
            [[players]]
            id = 42
            name = "Alice"
            permissions = ["cupboardinfo.use"]

            [messages.fr]
            Cleared = "Liste vidée"

            [[events]]
            kind = "deauthorized"
            player = 42
            authorized = [42, 7]
            "#,
        )
        .unwrap();

        assert_eq!(scenario.players.len(), 1);
        assert_eq!(scenario.players[0].locale, None);
        assert_eq!(scenario.messages["fr"]["Cleared"], "Liste vidée");
        assert_eq!(scenario.events[0].kind, EventKind::Deauthorized);
        assert_eq!(scenario.events[0].authorized, vec![42, 7]);
    }

    #[test]
    fn rejects_unknown_event_kind() {
        let err = Scenario::from_toml(
            r#"
            [[events]]
            kind = "exploded"
            player = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::Parse(_)));
    }
}
