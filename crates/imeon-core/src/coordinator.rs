// ── Update coordinator ──
//
// One coordinator per configured inverter. Owns the API client, polls
// the device, flattens the nested section state into a single-level
// snapshot, and publishes it through a watch channel. Refresh never
// fails: on timeout or any other error the previous snapshot stands
// (stale-but-available) and the failure is logged.
//
// The client lives behind one async mutex; refreshes and command
// invocations for the same device are serialized through it so the
// underlying HTTP session is never driven by two in-flight operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use imeon_api::{ImeonClient, REQUEST_TIMEOUT, TransportConfig};

use crate::command::Command;
use crate::config::DeviceConfig;
use crate::error::CoreError;
use crate::fields::TIMELINE_KEY;

/// Upper bound on one whole refresh (login + fetch, sequential).
const REFRESH_TIMEOUT: Duration = Duration::from_secs(4 * REQUEST_TIMEOUT.as_secs());

/// One flattened state snapshot. Ordered so repeated reads of unchanged
/// state compare (and serialize) identically.
pub type Snapshot = Arc<BTreeMap<String, Value>>;

#[derive(Debug)]
struct Inner {
    client: ImeonClient,
    username: String,
    password: SecretString,
    /// Set on creation and reconfiguration; the next refresh returns
    /// without network contact and clears it.
    first_call: bool,
    last_refresh: Option<DateTime<Utc>>,
}

/// The polling/caching object for one inverter.
#[derive(Debug)]
pub struct Coordinator {
    id: String,
    title: String,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<Snapshot>,
    refresh_timeout: Duration,
}

impl Coordinator {
    /// Create a coordinator for the device at `config.address`.
    ///
    /// The `id` is the stable label the registry and action dispatch key
    /// on; `title` is the display name. The snapshot starts empty and
    /// the first-call flag is armed.
    pub fn new(config: &DeviceConfig, id: &str, title: &str) -> Result<Self, CoreError> {
        let client = ImeonClient::new(&config.address, &TransportConfig::default())
            .map_err(CoreError::Api)?;
        let (snapshot_tx, _) = watch::channel(Snapshot::default());

        Ok(Self {
            id: id.to_owned(),
            title: title.to_owned(),
            inner: Mutex::new(Inner {
                client,
                username: config.username.clone(),
                password: config.password.clone(),
                first_call: true,
                last_refresh: None,
            }),
            snapshot_tx,
            refresh_timeout: REFRESH_TIMEOUT,
        })
    }

    /// Create a coordinator around a pre-built client (tests).
    pub fn with_client(client: ImeonClient, id: &str, title: &str, config: &DeviceConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            inner: Mutex::new(Inner {
                client,
                username: config.username.clone(),
                password: config.password.clone(),
                first_call: true,
                last_refresh: None,
            }),
            snapshot_tx,
            refresh_timeout: REFRESH_TIMEOUT,
        }
    }

    /// Override the whole-refresh time bound. Production keeps the
    /// default of four request timeouts; tests shrink it to exercise
    /// the elapsed path without waiting.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// The stable registry identifier (device label).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The latest flattened snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot changes. The receiver only wakes when a
    /// refresh actually changed the flattened state.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Wall-clock time of the last successful refresh, if any.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.last_refresh
    }

    /// Replace address and credentials in place.
    ///
    /// Re-arms the first-call flag so the next refresh re-establishes
    /// the session instead of assuming the old one is still valid.
    pub async fn update_config(&self, config: &DeviceConfig) -> Result<(), CoreError> {
        let client = ImeonClient::new(&config.address, &TransportConfig::default())
            .map_err(CoreError::Api)?;

        let mut inner = self.inner.lock().await;
        inner.client = client;
        inner.username = config.username.clone();
        inner.password = config.password.clone();
        inner.first_call = true;

        debug!(device = %self.id, "configuration replaced, first-call flag re-armed");
        Ok(())
    }

    /// Poll the device and return the latest snapshot.
    ///
    /// Never returns an error. The first call after creation or
    /// reconfiguration returns the current (empty or previous) snapshot
    /// without contacting the device; afterwards, login + fetch is
    /// bounded by the refresh timeout and any failure leaves the
    /// previous snapshot in place.
    pub async fn refresh(&self) -> Snapshot {
        let mut inner = self.inner.lock().await;

        if inner.first_call {
            inner.first_call = false;
            debug!(device = %self.id, "first refresh, no device contact");
            return self.snapshot();
        }

        match tokio::time::timeout(self.refresh_timeout, fetch(&mut inner)).await {
            Ok(Ok(())) => {
                let flattened = flatten(inner.client.storage());
                inner.last_refresh = Some(Utc::now());
                self.snapshot_tx.send_if_modified(|snapshot| {
                    if **snapshot == flattened {
                        false
                    } else {
                        *snapshot = Arc::new(flattened);
                        true
                    }
                });
            }
            Ok(Err(error)) => {
                warn!(device = %self.id, %error, "refresh failed, keeping previous snapshot");
            }
            Err(_) => {
                warn!(
                    device = %self.id,
                    "refresh timed out after {:?} -- check the address, credentials and \
                     network reachability; keeping previous snapshot",
                    self.refresh_timeout
                );
            }
        }

        self.snapshot()
    }

    /// Invoke one control command against the device.
    ///
    /// Takes the same per-device lock as [`refresh`](Self::refresh), so
    /// a command never interleaves with an in-flight poll.
    pub async fn invoke(&self, command: &Command) -> Result<Value, CoreError> {
        let inner = self.inner.lock().await;
        let client = &inner.client;

        client.login(&inner.username, &inner.password).await?;

        let result = match command {
            Command::InverterMode { mode } => client.set_inverter_mode(mode).await?,
            Command::Mppt { low, high } => client.set_mppt(*low, *high).await?,
            Command::FeedIn { active } => client.set_feed_in(*active).await?,
            Command::InjectionPower { limit } => client.set_injection_power(*limit).await?,
            Command::LcdTime { time } => client.set_lcd_time(*time).await?,
            Command::NightDischarge { active } => client.set_night_discharge(*active).await?,
            Command::GridCharge { active } => client.set_grid_charge(*active).await?,
            Command::Relay { active } => client.set_relay(*active).await?,
            Command::AcOutput { active } => client.set_ac_output(*active).await?,
        };
        Ok(result)
    }
}

async fn fetch(inner: &mut Inner) -> Result<(), imeon_api::Error> {
    inner.client.login(&inner.username, &inner.password).await?;

    // Once the identity block is populated the cheap incremental path
    // suffices; otherwise (first contact, device-side state loss) do a
    // full initialization fetch.
    if inner.client.has_inverter_identity() {
        inner.client.update().await
    } else {
        inner.client.init().await
    }
}

/// Flatten the nested `section -> field -> value` state into
/// `{section}_{field}` keys. The `timeline` section is a list of event
/// records and is copied verbatim under its own key, never flattened.
fn flatten(storage: &Map<String, Value>) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (section, value) in storage {
        match value {
            Value::Object(entries) if section != TIMELINE_KEY => {
                for (field, v) in entries {
                    out.insert(format!("{section}_{field}"), v.clone());
                }
            }
            other => {
                out.insert(section.clone(), other.clone());
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::flatten;

    fn as_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn sections_flatten_to_underscore_keys() {
        let storage = as_map(json!({
            "battery": { "soc": 42, "power": 100 },
            "timeline": [ { "message": "ok", "type": "good_1" } ]
        }));

        let flat = flatten(&storage);

        assert_eq!(flat["battery_soc"], json!(42));
        assert_eq!(flat["battery_power"], json!(100));
        assert_eq!(flat["timeline"], json!([{ "message": "ok", "type": "good_1" }]));
        assert!(!flat.contains_key("timeline_message"));
    }

    #[test]
    fn scalar_sections_pass_through() {
        let storage = as_map(json!({ "uptime": 12345 }));
        let flat = flatten(&storage);
        assert_eq!(flat["uptime"], json!(12345));
    }

    #[test]
    fn flatten_is_deterministic() {
        let storage = as_map(json!({
            "pv": { "power_total": 1.5 },
            "grid": { "frequency": 50.02 }
        }));
        assert_eq!(flatten(&storage), flatten(&storage));
    }
}
