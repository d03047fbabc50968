//! JSON file adapter for the due-date settings blob.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use tracing::{debug, warn};

use crate::task::{
    domain::DueDateSettings,
    ports::{SettingsError, SettingsStore},
};

/// Settings store backed by one JSON file inside a capability-scoped
/// directory.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    dir: Dir,
    file_name: String,
}

impl JsonFileSettingsStore {
    /// File name used when only a directory is given.
    pub const DEFAULT_FILE_NAME: &'static str = "priority_settings.json";

    /// Creates a store for `file_name` inside an already opened directory.
    #[must_use]
    pub fn new(dir: Dir, file_name: impl Into<String>) -> Self {
        Self {
            dir,
            file_name: file_name.into(),
        }
    }

    /// Opens the directory containing `path` and stores settings in the file
    /// it names.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when `path` has no file name or the
    /// parent directory cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, SettingsError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| std::io::Error::other("settings path must include a file name"))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        Ok(Self::new(dir, file_name))
    }

    /// Opens `dir` and stores settings in [`Self::DEFAULT_FILE_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the directory cannot be opened.
    pub fn open_dir(dir: &Utf8Path) -> Result<Self, SettingsError> {
        let opened = Dir::open_ambient_dir(dir, ambient_authority())?;
        Ok(Self::new(opened, Self::DEFAULT_FILE_NAME))
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<DueDateSettings, SettingsError> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(file = %self.file_name, "no stored settings, using defaults");
                return Ok(DueDateSettings::default());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<DueDateSettings>(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(file = %self.file_name, error = %err, "malformed settings, using defaults");
                Ok(DueDateSettings::default())
            }
        }
    }

    fn save(&self, settings: &DueDateSettings) -> Result<(), SettingsError> {
        let encoded = serde_json::to_string_pretty(settings)?;
        self.dir.write(&self.file_name, encoded)?;
        debug!(file = %self.file_name, "settings saved");
        Ok(())
    }
}
