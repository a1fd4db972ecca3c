//! Cupboard lifecycle notifications.
//!
//! | Event          | Acts when                          | Sends                              |
//! |----------------|------------------------------------|------------------------------------|
//! | `Cleared`      | gate passes                        | `Cleared` header                   |
//! | `Authorized`   | cupboard not empty and gate passes | `Authorized` header, then entries  |
//! | `Deauthorized` | cupboard not empty and gate passes | `StillAuthorized` header, entries  |
//!
//! Entries are every authorized player except the acting one, one chat line each. All
//! messages go to the acting player only. An event whose condition fails sends nothing.

use log::debug;
use std::fmt::Display;

use crate::config::Settings;
use crate::error::DispatchError;
use crate::host::{CupboardSnapshot, HostServices, LocalizationCatalog, Player, PlayerId};
use crate::lang::{self, format_template};

/// A cupboard lifecycle hook raised by the host.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    /// The authorization list was wiped.
    Cleared {
        cupboard: &'a CupboardSnapshot,
        player: &'a Player,
    },
    /// `player` authorized on the cupboard.
    Authorized {
        cupboard: &'a CupboardSnapshot,
        player: &'a Player,
    },
    /// `player` removed themselves from the cupboard.
    Deauthorized {
        cupboard: &'a CupboardSnapshot,
        player: &'a Player,
    },
}

impl<'a> LifecycleEvent<'a> {
    pub fn cupboard(&self) -> &'a CupboardSnapshot {
        match *self {
            LifecycleEvent::Cleared { cupboard, .. }
            | LifecycleEvent::Authorized { cupboard, .. }
            | LifecycleEvent::Deauthorized { cupboard, .. } => cupboard,
        }
    }

    pub fn player(&self) -> &'a Player {
        match *self {
            LifecycleEvent::Cleared { player, .. }
            | LifecycleEvent::Authorized { player, .. }
            | LifecycleEvent::Deauthorized { player, .. } => player,
        }
    }

    /// Host hook name, for logs.
    pub fn hook_name(&self) -> &'static str {
        match self {
            LifecycleEvent::Cleared { .. } => "OnCupboardClearList",
            LifecycleEvent::Authorized { .. } => "OnCupboardAuthorize",
            LifecycleEvent::Deauthorized { .. } => "OnCupboardDeauthorize",
        }
    }
}

/// One chat line per authorized player other than `excluding`, in cupboard order.
pub fn render_entries(
    cupboard: &CupboardSnapshot,
    excluding: PlayerId,
) -> impl Iterator<Item = String> + '_ {
    cupboard
        .entries()
        .iter()
        .filter(move |entry| entry.user_id != excluding)
        .map(|entry| format!(" {} {}", entry.user_id, entry.username))
}

/// Turns lifecycle events into chat messages for the acting player.
///
/// Borrows the current [`Settings`] for the duration of a dispatch; a reload builds a
/// new dispatcher over the new settings.
pub struct NotificationDispatcher<'a> {
    settings: &'a Settings,
    owner: &'a str,
    permission: &'a str,
}

impl<'a> NotificationDispatcher<'a> {
    /// `owner` is the plugin name messages are registered under; `permission` gates
    /// every event.
    pub fn new(settings: &'a Settings, owner: &'a str, permission: &'a str) -> Self {
        Self {
            settings,
            owner,
            permission,
        }
    }

    pub fn handle(
        &self,
        host: &mut HostServices<'_>,
        event: LifecycleEvent<'_>,
    ) -> Result<(), DispatchError> {
        let player = event.player();
        let cupboard = event.cupboard();

        let header = match event {
            LifecycleEvent::Cleared { .. } => lang::CLEARED,
            LifecycleEvent::Authorized { .. } => lang::AUTHORIZED,
            LifecycleEvent::Deauthorized { .. } => lang::STILL_AUTHORIZED,
        };
        let lists_entries = !matches!(event, LifecycleEvent::Cleared { .. });

        if lists_entries && cupboard.count() == 0 {
            debug!("{}: empty cupboard, nothing to report", event.hook_name());
            return Ok(());
        }
        if !self.check_permission(host, player, self.permission, false)? {
            debug!(
                "{}: {} ({}) lacks {}",
                event.hook_name(),
                player.name,
                player.id,
                self.permission
            );
            return Ok(());
        }

        let text = self.render(host.lang, header, player, &[])?;
        self.send_prefixed(host, player, &text);

        if lists_entries {
            for line in render_entries(cupboard, player.id) {
                host.chat.send_message(player, &line);
            }
        }
        Ok(())
    }

    /// Permission gate. Passes everyone while gating is off; otherwise mirrors the
    /// permission registry. A denied player is told so only when `announce_on_deny`.
    pub fn check_permission(
        &self,
        host: &mut HostServices<'_>,
        player: &Player,
        permission: &str,
        announce_on_deny: bool,
    ) -> Result<bool, DispatchError> {
        if !self.settings.permission_gated
            || host.permissions.has_permission(player.id, permission)
        {
            return Ok(true);
        }
        if announce_on_deny {
            let text = self.render(host.lang, lang::NO_PERMISSION, player, &[])?;
            self.send_prefixed(host, player, &text);
        }
        Ok(false)
    }

    /// Resolve `key` for the player's locale and substitute `args`.
    pub fn render(
        &self,
        catalog: &dyn LocalizationCatalog,
        key: &str,
        player: &Player,
        args: &[&dyn Display],
    ) -> Result<String, DispatchError> {
        let template = catalog
            .get_template(self.owner, key, player.id)
            .ok_or_else(|| DispatchError::MissingLocalizationKey {
                key: key.to_string(),
                player: player.id,
            })?;
        format_template(&template, args).map_err(|reason| DispatchError::Template {
            key: key.to_string(),
            reason,
        })
    }

    fn send_prefixed(&self, host: &mut HostServices<'_>, player: &Player, text: &str) {
        let line = format!("{} {}", self.settings.prefix, text);
        host.chat.send_message(player, &line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{ChatLog, MemoryCatalog, MemoryPermissions};
    use crate::host::{AuthorizedPlayer, LocalizationCatalog, PermissionRegistry};

    const OWNER: &str = "CupboardInfo";
    const PERM: &str = "cupboardinfo.use";

    fn catalog() -> MemoryCatalog {
        let mut lang = MemoryCatalog::new();
        lang.register_messages(OWNER, lang::DEFAULT_LOCALE, &lang::default_messages());
        lang
    }

    fn permissions(granted: &[u64]) -> MemoryPermissions {
        let mut perms = MemoryPermissions::new();
        perms.register_permission(PERM, OWNER);
        for id in granted {
            perms.grant(PlayerId(*id), PERM);
        }
        perms
    }

    fn settings(gated: bool) -> Settings {
        Settings {
            permission_gated: gated,
            ..Settings::default()
        }
    }

    #[test]
    fn gate_disabled_always_passes() {
        let settings = settings(false);
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let lang = catalog();
        let mut chat = ChatLog::new();

        for perms in [permissions(&[]), permissions(&[1, 2])] {
            let mut host = HostServices {
                permissions: &perms,
                lang: &lang,
                chat: &mut chat,
            };
            for id in [1, 2, 3] {
                let player = Player::new(id, "p");
                for name in [PERM, "other.perm", ""] {
                    assert!(dispatcher
                        .check_permission(&mut host, &player, name, true)
                        .unwrap());
                }
            }
        }
        assert!(chat.is_empty());
    }

    #[test]
    fn gate_enabled_mirrors_registry() {
        let settings = settings(true);
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let lang = catalog();
        let perms = permissions(&[1, 3]);
        let mut chat = ChatLog::new();
        let mut host = HostServices {
            permissions: &perms,
            lang: &lang,
            chat: &mut chat,
        };

        for id in 1..=4 {
            let player = Player::new(id, "p");
            for name in [PERM, "other.perm"] {
                let expected = perms.has_permission(PlayerId(id), name);
                let got = dispatcher
                    .check_permission(&mut host, &player, name, false)
                    .unwrap();
                assert_eq!(got, expected, "player {} permission {}", id, name);
            }
        }
        assert!(chat.is_empty(), "silent gate must not send anything");
    }

    #[test]
    fn announced_denial_sends_no_permission() {
        let settings = Settings {
            prefix: "[CI]".to_string(),
            ..settings(true)
        };
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let lang = catalog();
        let perms = permissions(&[]);
        let mut chat = ChatLog::new();
        let mut host = HostServices {
            permissions: &perms,
            lang: &lang,
            chat: &mut chat,
        };

        let player = Player::new(5, "Eve");
        assert!(!dispatcher
            .check_permission(&mut host, &player, PERM, true)
            .unwrap());
        assert_eq!(
            chat.messages_for(PlayerId(5)),
            vec!["[CI] You do not have permission to use this command"]
        );
    }

    #[test]
    fn render_entries_skips_acting_player() {
        let cupboard: CupboardSnapshot = [
            AuthorizedPlayer::new(1, "A"),
            AuthorizedPlayer::new(2, "B"),
            AuthorizedPlayer::new(3, "C"),
        ]
        .into_iter()
        .collect();

        let lines: Vec<String> = render_entries(&cupboard, PlayerId(2)).collect();
        assert_eq!(lines, vec![" 1 A", " 3 C"]);

        let none: Vec<String> = render_entries(&CupboardSnapshot::default(), PlayerId(2)).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn render_reports_missing_key() {
        let settings = settings(false);
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let lang = MemoryCatalog::new();
        let player = Player::new(9, "Zed");

        let err = dispatcher
            .render(&lang, lang::CLEARED, &player, &[])
            .unwrap_err();
        match err {
            DispatchError::MissingLocalizationKey { key, player } => {
                assert_eq!(key, "Cleared");
                assert_eq!(player, PlayerId(9));
            }
            other => panic!("expected missing key, got {:?}", other),
        }
    }

    #[test]
    fn render_substitutes_arguments() {
        let settings = settings(false);
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let mut lang = catalog();
        lang.set_message(OWNER, "en", "Count", "{0} players on {1}");
        let player = Player::new(1, "A");

        let text = dispatcher
            .render(&lang, "Count", &player, &[&3, &"cupboard"])
            .unwrap();
        assert_eq!(text, "3 players on cupboard");

        let err = dispatcher.render(&lang, "Count", &player, &[]).unwrap_err();
        assert!(matches!(err, DispatchError::Template { .. }));
    }

    #[test]
    fn cleared_reports_on_empty_cupboard() {
        let settings = settings(false);
        let dispatcher = NotificationDispatcher::new(&settings, OWNER, PERM);
        let lang = catalog();
        let perms = permissions(&[]);
        let mut chat = ChatLog::new();
        let player = Player::new(1, "A");
        let cupboard = CupboardSnapshot::default();

        {
            let mut host = HostServices {
                permissions: &perms,
                lang: &lang,
                chat: &mut chat,
            };
            dispatcher
                .handle(
                    &mut host,
                    LifecycleEvent::Cleared {
                        cupboard: &cupboard,
                        player: &player,
                    },
                )
                .unwrap();
        }
        assert_eq!(
            chat.messages_for(PlayerId(1)),
            vec![format!(
                "{} You have successfully cleared the cupboard list",
                crate::config::DEFAULT_PREFIX
            )
            .as_str()]
        );
    }
}
