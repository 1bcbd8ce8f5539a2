//! Shared helpers for command handlers.

use std::sync::Arc;

use imeon_config::Config;
use imeon_core::Coordinator;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config, honoring a `--config` path override.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match global.config {
        Some(ref path) => imeon_config::load_config_from(path)?,
        None => imeon_config::load_config()?,
    };
    Ok(config)
}

/// Save the config, honoring a `--config` path override.
pub fn save_config(global: &GlobalOpts, config: &Config) -> Result<(), CliError> {
    match global.config {
        Some(ref path) => imeon_config::save_config_to(path, config)?,
        None => imeon_config::save_config(config)?,
    }
    Ok(())
}

/// Resolve the target device label: explicit, or the configured default.
pub fn resolve_label(config: &Config, label: Option<String>) -> Result<String, CliError> {
    if let Some(label) = label {
        return Ok(label);
    }
    config
        .default_device
        .clone()
        .ok_or(CliError::NoDevices)
}

/// Build a coordinator for one configured device.
pub fn build_coordinator(config: &Config, label: &str) -> Result<Arc<Coordinator>, CliError> {
    let profile = config.device(label)?;
    let device = imeon_config::profile_to_device_config(profile, label)?;
    let coordinator = Coordinator::new(&device, label, label)?;
    Ok(Arc::new(coordinator))
}
