//! # CupboardInfo - cupboard authorization notices
//!
//! A game server plugin that tells players who else is authorized on a tool cupboard.
//! When a player clears a cupboard's authorization list, authorizes on it, or removes
//! their own authorization, the plugin sends them a localized header followed by the
//! remaining authorized players, one per line.
//!
//! ## Features
//!
//! - **Permission Gate**: optional `cupboardinfo.use` permission check, toggled in settings.
//! - **Localization**: messages resolved per player locale with default-locale fallback.
//! - **Self-Healing Settings**: versioned JSON settings; unusable files are backed up to
//!   `<Plugin>.error.json` and replaced by defaults, so the plugin always loads.
//! - **Replay Harness**: TOML scenarios drive the plugin against an in-memory host.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cupboardinfo::config::FileConfigStore;
//! use cupboardinfo::host::memory::{ChatLog, MemoryCatalog, MemoryPermissions};
//! use cupboardinfo::host::{AuthorizedPlayer, CupboardSnapshot, HostServices, Player};
//! use cupboardinfo::plugin::{CupboardInfo, PLUGIN_NAME};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut permissions = MemoryPermissions::new();
//!     let mut catalog = MemoryCatalog::new();
//!     let mut chat = ChatLog::new();
//!
//!     let store = FileConfigStore::new("oxide/config", PLUGIN_NAME);
//!     let (plugin, _outcome) = CupboardInfo::load(store, &mut permissions, &mut catalog);
//!
//!     let alice = Player::new(42, "Alice");
//!     let cupboard: CupboardSnapshot = [
//!         AuthorizedPlayer::new(42, "Alice"),
//!         AuthorizedPlayer::new(7, "Bob"),
//!     ]
//!     .into_iter()
//!     .collect();
//!
//!     let mut host = HostServices {
//!         permissions: &permissions,
//!         lang: &catalog,
//!         chat: &mut chat,
//!     };
//!     plugin.on_cupboard_authorize(&mut host, &cupboard, &alice)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - settings model, versioned loader with backup and recovery
//! - [`dispatch`] - lifecycle events, permission gate, entry rendering
//! - [`plugin`] - the plugin object and its host hooks
//! - [`host`] - host collaborator traits and in-memory implementations
//! - [`lang`] - message keys, default templates, positional formatting
//! - [`replay`] - scenario files for exercising the plugin outside a server

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod lang;
pub mod logutil;
pub mod plugin;
pub mod replay;
