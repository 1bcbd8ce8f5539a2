//! Device-profile configuration for the Imeon bridge.
//!
//! TOML profiles keyed by device label, credential resolution
//! (env + keyring + plaintext), and translation to
//! `imeon_core::DeviceConfig`. The label is the stable identifier the
//! registry and command dispatch key on -- immutable after creation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use imeon_core::DeviceConfig;

/// Environment variable consulted first for every device password.
pub const PASSWORD_ENV: &str = "IMEON_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device configured under label '{label}'")]
    UnknownDevice { label: String },

    #[error("a device is already configured under label '{label}'")]
    DuplicateDevice { label: String },

    #[error("no password configured for device '{label}'")]
    NoCredentials { label: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Label of the device commands target when none is given.
    pub default_device: Option<String>,

    /// Configured devices, keyed by label.
    #[serde(default)]
    pub devices: HashMap<String, DeviceProfile>,
}

/// Connection settings for one inverter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Network address (bare host, host:port, or URL).
    pub address: String,

    pub username: String,

    /// Password in plaintext -- prefer the keyring or [`PASSWORD_ENV`].
    pub password: Option<String>,
}

impl Config {
    /// The profile registered under `label`.
    pub fn device(&self, label: &str) -> Result<&DeviceProfile, ConfigError> {
        self.devices
            .get(label)
            .ok_or_else(|| ConfigError::UnknownDevice {
                label: label.to_owned(),
            })
    }

    /// Register a new device. The label must be unused; it becomes the
    /// device's permanent identifier.
    pub fn add_device(&mut self, label: &str, profile: DeviceProfile) -> Result<(), ConfigError> {
        validate_label(label)?;
        validate_profile(&profile)?;

        if self.devices.contains_key(label) {
            return Err(ConfigError::DuplicateDevice {
                label: label.to_owned(),
            });
        }

        if self.default_device.is_none() {
            self.default_device = Some(label.to_owned());
        }
        self.devices.insert(label.to_owned(), profile);
        Ok(())
    }

    /// Replace the connection settings of an existing device. The label
    /// itself cannot change.
    pub fn edit_device(&mut self, label: &str, profile: DeviceProfile) -> Result<(), ConfigError> {
        validate_profile(&profile)?;

        let Some(existing) = self.devices.get_mut(label) else {
            return Err(ConfigError::UnknownDevice {
                label: label.to_owned(),
            });
        };
        *existing = profile;
        Ok(())
    }

    /// Remove a device. Clears the default if it pointed there.
    pub fn remove_device(&mut self, label: &str) -> Result<DeviceProfile, ConfigError> {
        let profile = self
            .devices
            .remove(label)
            .ok_or_else(|| ConfigError::UnknownDevice {
                label: label.to_owned(),
            })?;

        if self.default_device.as_deref() == Some(label) {
            self.default_device = self.devices.keys().min().cloned();
        }
        Ok(profile)
    }

    /// All configured labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

fn validate_label(label: &str) -> Result<(), ConfigError> {
    if label.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "label".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

fn validate_profile(profile: &DeviceProfile) -> Result<(), ConfigError> {
    if profile.address.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: "must not be empty".into(),
        });
    }
    if profile.username.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "username".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "solhain", "imeon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("imeon");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full `Config` from a specific file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IMEON_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the `Config` from the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Serialize config to TOML and write it to a specific file.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Write config to the canonical path.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a device password from the credential chain.
pub fn resolve_password(profile: &DeviceProfile, label: &str) -> Result<SecretString, ConfigError> {
    // 1. Environment variable
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("imeon", &format!("{label}/password"))
        && let Ok(pw) = entry.get_password()
    {
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        label: label.to_owned(),
    })
}

/// Build the core connection config for one profile.
pub fn profile_to_device_config(
    profile: &DeviceProfile,
    label: &str,
) -> Result<DeviceConfig, ConfigError> {
    let password = resolve_password(profile, label)?;
    Ok(DeviceConfig::new(
        profile.address.clone(),
        profile.username.clone(),
        password,
    ))
}
