//! `imeon watch`, `imeon status`, `imeon set` -- the device-facing
//! commands. `watch` stands in for a host scheduler: it fires the
//! immediate post-setup refresh, then polls every device on the fixed
//! 1-minute cadence, printing entity changes as they happen.

use std::sync::Arc;

use owo_colors::OwoColorize;
use tracing::info;

use imeon_core::command::{self, Command};
use imeon_core::entity::{self, DeviceInfo, SensorEntity, TextEntity};
use imeon_core::{Coordinator, CoordinatorRegistry, REFRESH_INTERVAL};

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::error::CliError;
use crate::output;

/// Per-device bundle of a coordinator and its entity views.
struct WatchedDevice {
    coordinator: Arc<Coordinator>,
    sensors: Vec<SensorEntity>,
    texts: Vec<TextEntity>,
}

impl WatchedDevice {
    fn new(coordinator: Arc<Coordinator>) -> Self {
        let device = DeviceInfo::new(coordinator.id(), coordinator.title());
        let (sensors, texts) = entity::build_entities(&device);
        Self {
            coordinator,
            sensors,
            texts,
        }
    }

    /// Refresh and print every entity whose value changed.
    async fn poll_and_report(&mut self) {
        let snapshot = self.coordinator.refresh().await;
        let label = self.coordinator.id().to_owned();

        for sensor in &mut self.sensors {
            if sensor.apply(&snapshot) {
                let value = sensor
                    .value()
                    .map_or_else(|| "unavailable".to_owned(), |v| v.to_string());
                println!("{}  {}: {} {}", label.bold(), sensor.name, value, sensor.unit);
            }
        }
        for text in &mut self.texts {
            if text.apply(&snapshot) {
                let value = text.value().unwrap_or("unavailable").to_owned();
                println!("{}  {}: {}", label.bold(), text.name, value);
            }
        }
    }
}

// ── watch ────────────────────────────────────────────────────────────

pub async fn watch(global: &GlobalOpts, label: Option<String>) -> Result<(), CliError> {
    let config = util::load_config(global)?;

    let labels: Vec<String> = match label {
        Some(label) => vec![label],
        None => config.labels().into_iter().map(ToOwned::to_owned).collect(),
    };
    if labels.is_empty() {
        return Err(CliError::NoDevices);
    }

    let registry = CoordinatorRegistry::new();
    let mut devices = Vec::with_capacity(labels.len());
    for label in &labels {
        let coordinator = util::build_coordinator(&config, label)?;
        registry.register(Arc::clone(&coordinator));
        devices.push(WatchedDevice::new(coordinator));
    }

    // The immediate post-setup refresh: completes without device
    // contact, per the first-call contract.
    for device in &devices {
        device.coordinator.refresh().await;
    }

    info!(devices = devices.len(), "watching on a {}s cadence", REFRESH_INTERVAL.as_secs());

    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    interval.tick().await; // the immediate first tick

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for device in &mut devices {
                    device.poll_and_report().await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch loop");
                return Ok(());
            }
        }
    }
}

// ── status ───────────────────────────────────────────────────────────

pub async fn status(global: &GlobalOpts, label: Option<String>) -> Result<(), CliError> {
    let config = util::load_config(global)?;
    let label = util::resolve_label(&config, label)?;

    let coordinator = util::build_coordinator(&config, &label)?;

    // The first refresh completes registration without network; the
    // second actually contacts the device.
    coordinator.refresh().await;
    let snapshot = coordinator.refresh().await;

    let mut device = WatchedDevice::new(coordinator);
    for sensor in &mut device.sensors {
        sensor.apply(&snapshot);
    }
    for text in &mut device.texts {
        text.apply(&snapshot);
    }

    println!("{}", output::device_header(&label, device.coordinator.title()));
    if let Some(at) = device.coordinator.last_refresh().await {
        println!("last refresh: {}", at.to_rfc3339());
    } else {
        println!("{}", "device did not answer; values may be stale or empty".dimmed());
    }
    println!("{}", output::render_entities(&device.sensors, &device.texts));
    Ok(())
}

// ── set ──────────────────────────────────────────────────────────────

pub async fn set(
    global: &GlobalOpts,
    label: &str,
    action: &str,
    args: &[String],
) -> Result<(), CliError> {
    let config = util::load_config(global)?;

    let registry = CoordinatorRegistry::new();
    registry.register(util::build_coordinator(&config, label)?);

    let command = Command::from_args(action, args)?;
    let response = command::dispatch(&registry, label, &command).await?;

    println!("{}", serde_json::json!({ "result": response.result }));

    if response.is_failed() {
        return Err(CliError::ActionFailed {
            command: command.name().to_owned(),
        });
    }
    Ok(())
}
