//! Persistent configuration: the TOML settings file.

pub mod settings;

pub use settings::{
    load_settings, CliOverrides, SettingsError, SettingsFile, DEFAULT_SETTINGS_PATH,
};
