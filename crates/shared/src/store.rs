//! Settings persistence.
//!
//! The panel loads its [`Settings`] once at startup and writes them back
//! through a [`SettingsStore`] whenever the user changes them.

use crate::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Backing storage for the settings record.
pub trait SettingsStore: Send {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Settings>>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// `settings.json` on disk, pretty-printed.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform config directory.
    pub fn in_config_dir() -> Result<Self> {
        let proj = directories::ProjectDirs::from("com.local", "Gemini Panel", "GeminiPanel")
            .ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(proj.config_dir().join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(|e| self.io_err(e))?;
        let settings = serde_json::from_slice::<Settings>(&bytes)?;
        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, bytes).map_err(|e| self.io_err(e))?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// In-process store, used by tests and when no config dir exists.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
        }
    }

    pub fn saved(&self) -> Option<Settings> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>> {
        Ok(self.saved())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut slot = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(settings.clone());
        Ok(())
    }
}

impl<S: SettingsStore + Sync> SettingsStore for Arc<S> {
    fn load(&self) -> Result<Option<Settings>> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        (**self).save(settings)
    }
}

/// Load stored settings, falling back to defaults on a missing or unreadable file.
pub fn load_or_default(store: &dyn SettingsStore) -> Settings {
    match store.load() {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!("could not load settings, using defaults: {}", e);
            Settings::default()
        }
    }
}
