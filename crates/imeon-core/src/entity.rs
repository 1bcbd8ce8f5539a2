// ── Entities ──
//
// Read-only per-field views over a coordinator snapshot. A sensor binds
// one numeric field, a text entity one string field (plus the synthetic
// timeline entity). Each keeps its last-rendered value and skips
// re-rendering when a refresh left its field unchanged.

use serde_json::Value;

use crate::coordinator::Snapshot;
use crate::fields::{
    self, FieldKind, NUMERIC_ICON, RATIO_KEYS, TEXT_ICON, TIMELINE_KEY, timeline_icon,
};

/// Field reserved for mode naming; raw codes map to display labels.
pub const MODE_NAME_KEY: &str = "mode_name";

/// Common identity block shared by every entity of one device, so a
/// consumer groups them all under one logical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The registration's stable identifier.
    pub identifier: String,
    /// Display name (the device label).
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: &'static str,
}

impl DeviceInfo {
    pub fn new(identifier: &str, name: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            name: name.to_owned(),
            manufacturer: "Imeon Energy",
            model: "Imeon Bridge",
            sw_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

// ── Numeric sensors ─────────────────────────────────────────────────

/// A numeric sensor bound to one snapshot key.
#[derive(Debug, Clone)]
pub struct SensorEntity {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
    pub device: DeviceInfo,
    /// Raw value as last fetched; `None` means unavailable.
    raw: Option<f64>,
}

impl SensorEntity {
    pub fn new(key: &'static str, name: &'static str, unit: &'static str, device: DeviceInfo) -> Self {
        Self {
            key,
            name,
            unit,
            icon: NUMERIC_ICON,
            device,
            raw: None,
        }
    }

    /// Re-read this entity's field from a fresh snapshot.
    ///
    /// Returns `true` if the value changed (a re-render is due). A raw
    /// value that fails to parse as a number makes the entity
    /// unavailable, not an error.
    pub fn apply(&mut self, snapshot: &Snapshot) -> bool {
        let fetched = snapshot.get(self.key).and_then(parse_numeric);
        if fetched == self.raw {
            return false;
        }
        self.raw = fetched;
        true
    }

    /// The display value: ratio fields scaled to percent, everything
    /// rounded to 2 decimals. `None` when unavailable.
    pub fn value(&self) -> Option<f64> {
        self.raw.map(|raw| {
            if RATIO_KEYS.contains(&self.key) {
                round2(raw * 100.0)
            } else {
                round2(raw)
            }
        })
    }

    /// Accepted but a no-op: sensors are read-only until a write path
    /// exists.
    pub fn set_value(&mut self, _value: f64) {}
}

// ── Text entities ───────────────────────────────────────────────────

/// A text entity bound to one snapshot key.
#[derive(Debug, Clone)]
pub struct TextEntity {
    pub key: &'static str,
    pub name: &'static str,
    /// Current icon; the timeline entity swaps it per event type.
    pub icon: &'static str,
    pub device: DeviceInfo,
    raw: Option<String>,
}

impl TextEntity {
    pub fn new(key: &'static str, name: &'static str, device: DeviceInfo) -> Self {
        Self {
            key,
            name,
            icon: TEXT_ICON,
            device,
            raw: None,
        }
    }

    /// Re-read this entity's field from a fresh snapshot.
    ///
    /// The timeline entity reads the most recent event record's message
    /// and selects an icon from the event-type table (default icon when
    /// the type is unrecognized). Returns `true` if the value changed.
    pub fn apply(&mut self, snapshot: &Snapshot) -> bool {
        if self.key == TIMELINE_KEY {
            let Some(event) = snapshot.get(TIMELINE_KEY).and_then(latest_event) else {
                return self.replace(None);
            };
            let message = event.get("message").map(value_to_string);
            if message == self.raw {
                return false;
            }
            self.icon = event
                .get("type")
                .and_then(Value::as_str)
                .and_then(timeline_icon)
                .unwrap_or(TEXT_ICON);
            self.raw = message;
            return true;
        }

        let fetched = snapshot.get(self.key).map(value_to_string);
        self.replace(fetched)
    }

    fn replace(&mut self, fetched: Option<String>) -> bool {
        if fetched == self.raw {
            return false;
        }
        self.raw = fetched;
        true
    }

    /// The display value, with mode codes mapped to their labels.
    /// `None` when unavailable.
    pub fn value(&self) -> Option<&str> {
        let raw = self.raw.as_deref()?;
        if self.key == MODE_NAME_KEY
            && let Some(label) = fields::mode_label(raw)
        {
            return Some(label);
        }
        Some(raw)
    }

    /// Accepted but a no-op: text entities are read-only until a write
    /// path exists.
    pub fn set_value(&mut self, _value: &str) {}
}

// ── Transforms ──────────────────────────────────────────────────────

/// Parse a snapshot value as f64, accepting numbers and numeric
/// strings. `None` on anything else.
fn parse_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The most recent record of a timeline list (index 0).
fn latest_event(timeline: &Value) -> Option<&Value> {
    timeline.as_array().and_then(|events| events.first())
}

// ── Construction ────────────────────────────────────────────────────

/// Build the full entity set for one device: a sensor per numeric field,
/// a text entity per text field, plus the synthetic timeline entity.
pub fn build_entities(device: &DeviceInfo) -> (Vec<SensorEntity>, Vec<TextEntity>) {
    let mut sensors = Vec::new();
    let mut texts = Vec::new();

    for field in fields::FIELDS {
        match field.kind {
            FieldKind::Numeric { unit } => {
                sensors.push(SensorEntity::new(field.key, field.name, unit, device.clone()));
            }
            FieldKind::Text => {
                texts.push(TextEntity::new(field.key, field.name, device.clone()));
            }
        }
    }
    texts.push(TextEntity::new(TIMELINE_KEY, "Timeline", device.clone()));

    (sensors, texts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn snapshot(entries: &[(&str, Value)]) -> Snapshot {
        let map: BTreeMap<String, Value> = entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        Arc::new(map)
    }

    fn device() -> DeviceInfo {
        DeviceInfo::new("garage", "Garage Inverter")
    }

    #[test]
    fn ratio_field_scales_to_percent() {
        let mut sensor = SensorEntity::new("qu1", "QU1", "%", device());
        assert!(sensor.apply(&snapshot(&[("qu1", json!(0.42))])));
        assert_eq!(sensor.value(), Some(42.0));
    }

    #[test]
    fn plain_field_rounds_without_scaling() {
        let mut sensor = SensorEntity::new("battery_soc", "Battery SOC", "%", device());
        assert!(sensor.apply(&snapshot(&[("battery_soc", json!(42.345))])));
        assert_eq!(sensor.value(), Some(42.35));
    }

    #[test]
    fn numeric_string_parses() {
        let mut sensor = SensorEntity::new("grid_frequency", "Grid Frequency", "Hz", device());
        assert!(sensor.apply(&snapshot(&[("grid_frequency", json!("50.02"))])));
        assert_eq!(sensor.value(), Some(50.02));
    }

    #[test]
    fn bad_parse_means_unavailable_not_error() {
        let mut sensor = SensorEntity::new("battery_soc", "Battery SOC", "%", device());
        sensor.apply(&snapshot(&[("battery_soc", json!(42))]));
        assert_eq!(sensor.value(), Some(42.0));

        assert!(sensor.apply(&snapshot(&[("battery_soc", json!("n/a"))])));
        assert_eq!(sensor.value(), None);
    }

    #[test]
    fn unchanged_value_skips_re_render() {
        let mut sensor = SensorEntity::new("battery_soc", "Battery SOC", "%", device());
        let snap = snapshot(&[("battery_soc", json!(42))]);
        assert!(sensor.apply(&snap));
        assert!(!sensor.apply(&snap));
    }

    #[test]
    fn mode_name_maps_known_codes() {
        let mut text = TextEntity::new(MODE_NAME_KEY, "Mode", device());
        text.apply(&snapshot(&[(MODE_NAME_KEY, json!("SMG"))]));
        assert_eq!(text.value(), Some("Smart Grid"));

        text.apply(&snapshot(&[(MODE_NAME_KEY, json!("150"))]));
        assert_eq!(text.value(), Some("Off Grid"));

        text.apply(&snapshot(&[(MODE_NAME_KEY, json!("custom"))]));
        assert_eq!(text.value(), Some("custom"));
    }

    #[test]
    fn timeline_shows_latest_message_and_icon() {
        let mut text = TextEntity::new(TIMELINE_KEY, "Timeline", device());
        let snap = snapshot(&[(
            TIMELINE_KEY,
            json!([
                { "message": "communication lost", "type": "com_lost" },
                { "message": "all good", "type": "good_1" }
            ]),
        )]);

        assert!(text.apply(&snap));
        assert_eq!(text.value(), Some("communication lost"));
        assert_eq!(text.icon, "mdi:lan-disconnect");
        assert!(!text.apply(&snap));
    }

    #[test]
    fn timeline_unknown_type_keeps_default_icon() {
        let mut text = TextEntity::new(TIMELINE_KEY, "Timeline", device());
        text.apply(&snapshot(&[(
            TIMELINE_KEY,
            json!([{ "message": "odd", "type": "mystery" }]),
        )]));
        assert_eq!(text.icon, TEXT_ICON);
    }

    #[test]
    fn full_entity_set_covers_registry_plus_timeline() {
        let (sensors, texts) = build_entities(&device());
        let numeric = fields::FIELDS
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Numeric { .. }))
            .count();
        assert_eq!(sensors.len(), numeric);
        assert_eq!(texts.len(), fields::FIELDS.len() - numeric + 1);
        assert!(texts.iter().any(|t| t.key == TIMELINE_KEY));
    }

    #[test]
    fn entities_share_one_device_identity() {
        let (sensors, texts) = build_entities(&device());
        let first = &sensors[0].device;
        assert!(sensors.iter().all(|s| s.device == *first));
        assert!(texts.iter().all(|t| t.device == *first));
        assert_eq!(first.manufacturer, "Imeon Energy");
    }
}
