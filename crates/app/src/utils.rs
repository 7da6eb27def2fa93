//! Startup helpers: settings store selection and session overrides.

use shared::settings::Settings;
use shared::store::{load_or_default, JsonFileStore, MemoryStore, SettingsStore};

/// The on-disk store, or an in-memory one when the platform has no config dir.
pub fn open_settings_store() -> Box<dyn SettingsStore> {
    match JsonFileStore::in_config_dir() {
        Ok(store) => {
            tracing::info!(path = %store.path().display(), "using settings file");
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("settings will not be saved: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Load stored settings and apply environment / command-line overrides.
///
/// `env_key` only fills in a key when none is stored.
pub fn startup_settings(
    store: &dyn SettingsStore,
    env_key: Option<String>,
    model_override: Option<String>,
) -> Settings {
    let mut settings = load_or_default(store);

    if !settings.has_api_key() {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            tracing::info!("using GEMINI_API_KEY from the environment");
            settings.api_key = key;
        }
    }

    if let Some(model) = model_override.filter(|m| !m.trim().is_empty()) {
        settings.model = model;
    }

    settings
}
