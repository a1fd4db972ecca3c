//! Test utilities & fixtures.
//! Static fixtures live under `tests/test-data-int`; tests that write settings use a temp dir.

use std::path::{Path, PathBuf};

use cupboardinfo::config::{FileConfigStore, LoadOutcome, Settings};
use cupboardinfo::host::memory::{ChatLog, MemoryCatalog, MemoryPermissions};
use cupboardinfo::host::{AuthorizedPlayer, CupboardSnapshot, HostServices};
use cupboardinfo::plugin::{CupboardInfo, PLUGIN_NAME};

/// Return the path to the static integration test fixture directory.
#[allow(dead_code)]
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

/// In-memory host: permissions, lang catalog and a chat recorder.
#[allow(dead_code)]
#[derive(Default)]
pub struct TestHost {
    pub permissions: MemoryPermissions,
    pub catalog: MemoryCatalog,
    pub chat: ChatLog,
}

#[allow(dead_code)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn services(&mut self) -> HostServices<'_> {
        HostServices {
            permissions: &self.permissions,
            lang: &self.catalog,
            chat: &mut self.chat,
        }
    }

    /// Load the plugin from `dir`, registering its permission and messages on this host.
    pub fn load_plugin(&mut self, dir: &Path) -> (CupboardInfo<FileConfigStore>, LoadOutcome) {
        CupboardInfo::load(
            FileConfigStore::new(dir, PLUGIN_NAME),
            &mut self.permissions,
            &mut self.catalog,
        )
    }
}

/// Write a versioned settings file for the plugin into `dir`.
#[allow(dead_code)]
pub fn write_settings(dir: &Path, prefix: &str, gated: bool) {
    let settings = Settings {
        prefix: prefix.to_string(),
        permission_gated: gated,
        ..Settings::default()
    };
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join(format!("{}.json", PLUGIN_NAME)),
        settings.to_json().unwrap(),
    )
    .unwrap();
}

#[allow(dead_code)]
pub fn cupboard(entries: &[(u64, &str)]) -> CupboardSnapshot {
    entries
        .iter()
        .map(|(id, name)| AuthorizedPlayer::new(*id, *name))
        .collect()
}
