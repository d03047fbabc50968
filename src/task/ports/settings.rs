//! Settings port for the priority due-date table.

use crate::task::domain::DueDateSettings;
use std::sync::Arc;
use thiserror::Error;

/// Storage for the due-date settings blob.
///
/// Settings are read once at start-up and handed to services by value, so
/// the port is synchronous.
pub trait SettingsStore: Send + Sync {
    /// Loads the settings, falling back to [`DueDateSettings::default`] when
    /// nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the storage itself fails.
    fn load(&self) -> Result<DueDateSettings, SettingsError>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the blob cannot be encoded or written.
    fn save(&self, settings: &DueDateSettings) -> Result<(), SettingsError>;
}

/// Errors returned by settings stores.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// Storage failure.
    #[error("settings storage error: {0}")]
    Io(Arc<std::io::Error>),

    /// The settings could not be encoded.
    #[error("settings encoding error: {0}")]
    Encoding(Arc<serde_json::Error>),
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(Arc::new(err))
    }
}
