//! Settings persistence.
//!
//! The host keeps one JSON file per plugin in its config directory. When a file has to
//! be set aside because it could not be loaded, it is copied next to the original with
//! an `.error` marker: `CupboardInfo.json` -> `CupboardInfo.error.json`.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Which file a write goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTarget {
    /// The live settings file.
    Primary,
    /// The sibling file that preserves unloadable content.
    Backup,
}

/// Raw access to the settings file of one plugin.
pub trait ConfigStore {
    /// Read the live settings file as stored bytes. `Ok(None)` means it does not exist
    /// yet. Decoding is left to the caller so undecodable content can still be backed up.
    fn read_raw(&self) -> io::Result<Option<Vec<u8>>>;

    /// Write `raw` to `target`, returning the path written.
    fn write_raw(&self, raw: &[u8], target: ConfigTarget) -> io::Result<PathBuf>;

    /// Path a write to `target` would land on.
    fn path_for(&self, target: ConfigTarget) -> PathBuf;
}

/// File-backed store rooted at the host config directory.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
    name: String,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>, plugin_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: plugin_name.into(),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn read_raw(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(ConfigTarget::Primary)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_raw(&self, raw: &[u8], target: ConfigTarget) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(target);
        fs::write(&path, raw)?;
        Ok(path)
    }

    fn path_for(&self, target: ConfigTarget) -> PathBuf {
        match target {
            ConfigTarget::Primary => self.dir.join(format!("{}.json", self.name)),
            ConfigTarget::Backup => self.dir.join(format!("{}.error.json", self.name)),
        }
    }
}
