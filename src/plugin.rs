//! The `CupboardInfo` plugin as seen by the host.
//!
//! The host loads the plugin once, then calls the three cupboard hooks from its game
//! thread. Reloading swaps in freshly loaded settings between hook calls.

use log::{info, warn};

use crate::config::{ConfigManager, ConfigStore, LoadOutcome, Settings};
use crate::dispatch::{LifecycleEvent, NotificationDispatcher};
use crate::error::DispatchError;
use crate::host::{CupboardSnapshot, HostServices, LocalizationCatalog, PermissionRegistry, Player};
use crate::lang;

/// Name the plugin registers permissions, messages and its config file under.
pub const PLUGIN_NAME: &str = "CupboardInfo";

/// Permission required to receive notices while gating is on.
pub const USE_PERMISSION: &str = "cupboardinfo.use";

pub struct CupboardInfo<S: ConfigStore> {
    config: ConfigManager<S>,
    settings: Settings,
}

impl<S: ConfigStore> CupboardInfo<S> {
    /// Plugin load: register messages and the use permission, then load settings.
    ///
    /// Never fails; an unusable settings file is replaced by defaults.
    pub fn load(
        store: S,
        permissions: &mut dyn PermissionRegistry,
        catalog: &mut dyn LocalizationCatalog,
    ) -> (Self, LoadOutcome) {
        catalog.register_messages(PLUGIN_NAME, lang::DEFAULT_LOCALE, &lang::default_messages());
        permissions.register_permission(USE_PERMISSION, PLUGIN_NAME);

        let config = ConfigManager::new(store);
        let outcome = config.load_and_persist();
        let settings = outcome.settings().clone();
        info!("{} loaded (v{})", PLUGIN_NAME, env!("CARGO_PKG_VERSION"));
        (Self { config, settings }, outcome)
    }

    /// Re-read settings from the store and replace the current ones.
    pub fn reload(&mut self) -> LoadOutcome {
        let outcome = self.config.load_and_persist();
        if outcome.is_recovered() {
            warn!("{} reload fell back to default settings", PLUGIN_NAME);
        }
        self.settings = outcome.settings().clone();
        outcome
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &ConfigManager<S> {
        &self.config
    }

    pub fn dispatcher(&self) -> NotificationDispatcher<'_> {
        NotificationDispatcher::new(&self.settings, PLUGIN_NAME, USE_PERMISSION)
    }

    pub fn handle(
        &self,
        host: &mut HostServices<'_>,
        event: LifecycleEvent<'_>,
    ) -> Result<(), DispatchError> {
        self.dispatcher().handle(host, event)
    }

    /// `OnCupboardClearList`
    pub fn on_cupboard_clear_list(
        &self,
        host: &mut HostServices<'_>,
        cupboard: &CupboardSnapshot,
        player: &Player,
    ) -> Result<(), DispatchError> {
        self.handle(host, LifecycleEvent::Cleared { cupboard, player })
    }

    /// `OnCupboardAuthorize`
    pub fn on_cupboard_authorize(
        &self,
        host: &mut HostServices<'_>,
        cupboard: &CupboardSnapshot,
        player: &Player,
    ) -> Result<(), DispatchError> {
        self.handle(host, LifecycleEvent::Authorized { cupboard, player })
    }

    /// `OnCupboardDeauthorize`
    pub fn on_cupboard_deauthorize(
        &self,
        host: &mut HostServices<'_>,
        cupboard: &CupboardSnapshot,
        player: &Player,
    ) -> Result<(), DispatchError> {
        self.handle(host, LifecycleEvent::Deauthorized { cupboard, player })
    }
}
