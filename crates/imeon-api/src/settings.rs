// Writable settings
//
// One method per writable inverter setting, each posting to
// `/api/set/{name}` with a JSON body of named arguments. The device
// answers with its usual envelope; the unwrapped `data` value is
// returned verbatim so callers can report it.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::ImeonClient;
use crate::error::Error;

impl ImeonClient {
    /// Set the inverter operating mode.
    ///
    /// `POST /api/set/inverter-mode` with `{"mode": "smg"|"bup"|"ong"|"ofg"}`
    pub async fn set_inverter_mode(&self, mode: &str) -> Result<Value, Error> {
        debug!(mode, "setting inverter mode");
        self.post("set/inverter-mode", &json!({ "mode": mode })).await
    }

    /// Set the MPPT voltage tracking range.
    ///
    /// `POST /api/set/mppt` with `{"low": .., "high": ..}`
    pub async fn set_mppt(&self, low: i64, high: i64) -> Result<Value, Error> {
        debug!(low, high, "setting MPPT range");
        self.post("set/mppt", &json!({ "low": low, "high": high })).await
    }

    /// Enable or disable grid feed-in.
    ///
    /// `POST /api/set/feed-in` with `{"active": bool}`
    pub async fn set_feed_in(&self, active: bool) -> Result<Value, Error> {
        debug!(active, "setting feed-in");
        self.post("set/feed-in", &json!({ "active": active })).await
    }

    /// Set the grid injection power limit in watts.
    ///
    /// `POST /api/set/injection-power` with `{"limit": ..}`
    pub async fn set_injection_power(&self, limit: i64) -> Result<Value, Error> {
        debug!(limit, "setting injection power limit");
        self.post("set/injection-power", &json!({ "limit": limit })).await
    }

    /// Set the LCD backlight time in minutes (0 = always on).
    ///
    /// `POST /api/set/lcd-time` with `{"time": ..}`
    pub async fn set_lcd_time(&self, time: i64) -> Result<Value, Error> {
        debug!(time, "setting LCD time");
        self.post("set/lcd-time", &json!({ "time": time })).await
    }

    /// Enable or disable night battery discharge.
    ///
    /// `POST /api/set/night-discharge` with `{"active": bool}`
    pub async fn set_night_discharge(&self, active: bool) -> Result<Value, Error> {
        debug!(active, "setting night discharge");
        self.post("set/night-discharge", &json!({ "active": active })).await
    }

    /// Enable or disable battery charging from the grid.
    ///
    /// `POST /api/set/grid-charge` with `{"active": bool}`
    pub async fn set_grid_charge(&self, active: bool) -> Result<Value, Error> {
        debug!(active, "setting grid charge");
        self.post("set/grid-charge", &json!({ "active": active })).await
    }

    /// Switch the auxiliary relay.
    ///
    /// `POST /api/set/relay` with `{"active": bool}`
    pub async fn set_relay(&self, active: bool) -> Result<Value, Error> {
        debug!(active, "setting relay");
        self.post("set/relay", &json!({ "active": active })).await
    }

    /// Enable or disable the AC output.
    ///
    /// `POST /api/set/ac-output` with `{"active": bool}`
    pub async fn set_ac_output(&self, active: bool) -> Result<Value, Error> {
        debug!(active, "setting AC output");
        self.post("set/ac-output", &json!({ "active": active })).await
    }
}
