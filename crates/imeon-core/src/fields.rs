// ── Field registry ──
//
// Static table of every readable metric the inverter reports, keyed by
// the flattened `{section}_{field}` form the coordinator produces. Pure
// configuration data: loaded at compile time, never mutated.

/// Whether a field renders as a numeric sensor or a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Floating-point metric with an optional display unit.
    Numeric { unit: &'static str },
    Text,
}

/// Display metadata for one readable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Flattened snapshot key (`{section}_{field}`).
    pub key: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn numeric(key: &'static str, name: &'static str, unit: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        key,
        name,
        kind: FieldKind::Numeric { unit },
    }
}

const fn text(key: &'static str, name: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        key,
        name,
        kind: FieldKind::Text,
    }
}

/// Every readable field, grouped by device section.
pub const FIELDS: &[FieldDescriptor] = &[
    // ── Battery ─────────────────────────────────────────────────────
    numeric("battery_autonomy", "Battery Autonomy", ""),
    numeric("battery_charge_time", "Battery Charge Time", ""),
    numeric("battery_power", "Battery Power", "W"),
    numeric("battery_soc", "Battery SOC", "%"),
    text("battery_status", "Battery Status"),
    numeric("battery_stored", "Battery Stored", "Wh"),
    // ── Grid ────────────────────────────────────────────────────────
    numeric("grid_current_l1", "Grid Current L1", "A"),
    numeric("grid_current_l2", "Grid Current L2", "A"),
    numeric("grid_current_l3", "Grid Current L3", "A"),
    numeric("grid_frequency", "Grid Frequency", "Hz"),
    numeric("grid_voltage_l1", "Grid Voltage L1", "V"),
    numeric("grid_voltage_l2", "Grid Voltage L2", "V"),
    numeric("grid_voltage_l3", "Grid Voltage L3", "V"),
    // ── AC input ────────────────────────────────────────────────────
    numeric("input_power_l1", "Input Power L1", "W"),
    numeric("input_power_l2", "Input Power L2", "W"),
    numeric("input_power_l3", "Input Power L3", "W"),
    numeric("input_power_total", "Input Power Total", "W"),
    // ── Inverter identity & limits ──────────────────────────────────
    numeric(
        "inverter_charging-current-limit",
        "Charging Current Limit",
        "A",
    ),
    numeric(
        "inverter_injection-power-limit",
        "Injection Power Limit",
        "W",
    ),
    text("inverter_inverter", "Inverter Model"),
    text("inverter_serial", "Inverter Serial Number"),
    text("inverter_software", "Inverter Software Version"),
    // ── Manager ─────────────────────────────────────────────────────
    text("manager_inverter_mode", "Inverter Mode"),
    text("manager_inverter_state", "Inverter State"),
    text("manager_relay_check", "Relay Check"),
    text("manager_relay_state", "Relay State"),
    // ── Meter ───────────────────────────────────────────────────────
    text("meter_active", "Meter Active"),
    numeric("meter_power", "Meter Power", "W"),
    numeric("meter_power_protocol", "Meter Power Protocol", "W"),
    // ── Monitoring (daily aggregates) ───────────────────────────────
    numeric(
        "monitoring_building_consumption",
        "Monitoring Building Consumption",
        "Wh",
    ),
    numeric("monitoring_economy_factor", "Monitoring Economy Factor", ""),
    numeric(
        "monitoring_grid_consumption",
        "Monitoring Grid Consumption",
        "Wh",
    ),
    numeric("monitoring_grid_injection", "Monitoring Grid Injection", "Wh"),
    numeric(
        "monitoring_grid_power_flow",
        "Monitoring Grid Power Flow",
        "Wh",
    ),
    numeric(
        "monitoring_self_consumption",
        "Monitoring Self Consumption",
        "%",
    ),
    numeric(
        "monitoring_self_sufficiency",
        "Monitoring Self Sufficiency",
        "%",
    ),
    numeric(
        "monitoring_solar_production",
        "Monitoring Solar Production",
        "Wh",
    ),
    // ── Monitoring (rolling minute) ─────────────────────────────────
    numeric(
        "monitoring_minute_building_consumption",
        "Monitoring Building Consumption (minute)",
        "W",
    ),
    numeric(
        "monitoring_minute_grid_consumption",
        "Monitoring Grid Consumption (minute)",
        "W",
    ),
    numeric(
        "monitoring_minute_grid_injection",
        "Monitoring Grid Injection (minute)",
        "W",
    ),
    numeric(
        "monitoring_minute_grid_power_flow",
        "Monitoring Grid Power Flow (minute)",
        "W",
    ),
    numeric(
        "monitoring_minute_solar_production",
        "Monitoring Solar Production (minute)",
        "W",
    ),
    // ── AC output ───────────────────────────────────────────────────
    numeric("output_current_l1", "Output Current L1", "A"),
    numeric("output_current_l2", "Output Current L2", "A"),
    numeric("output_current_l3", "Output Current L3", "A"),
    numeric("output_frequency", "Output Frequency", "Hz"),
    numeric("output_power_l1", "Output Power L1", "W"),
    numeric("output_power_l2", "Output Power L2", "W"),
    numeric("output_power_l3", "Output Power L3", "W"),
    numeric("output_power_total", "Output Power Total", "W"),
    numeric("output_voltage_l1", "Output Voltage L1", "V"),
    numeric("output_voltage_l2", "Output Voltage L2", "V"),
    numeric("output_voltage_l3", "Output Voltage L3", "V"),
    // ── PV ──────────────────────────────────────────────────────────
    numeric("pv_consumed", "PV Consumed", "Wh"),
    numeric("pv_injected", "PV Injected", "Wh"),
    numeric("pv_power_1", "PV Power 1", "W"),
    numeric("pv_power_2", "PV Power 2", "W"),
    numeric("pv_power_total", "PV Power Total", "W"),
    // ── Temperature ─────────────────────────────────────────────────
    numeric("temp_air_temperature", "Air Temperature", "°C"),
    numeric("temp_component_temperature", "Component Temperature", "°C"),
];

/// Snapshot key of the synthetic timeline text entity. The value is a
/// list of event records, never a flattened section.
pub const TIMELINE_KEY: &str = "timeline";

/// Keys whose raw value is a 0..1 ratio, presented as a percentage.
///
/// Not part of [`FIELDS`]; some firmware revisions report these and the
/// percent transform has to stand ready for them.
pub const RATIO_KEYS: &[&str] = &["qu1", "qu2", "qu3", "qu4"];

/// Default icon for numeric sensor entities.
pub const NUMERIC_ICON: &str = "mdi:numeric";

/// Default icon for text entities.
pub const TEXT_ICON: &str = "mdi:alphabetical";

/// Look up a field descriptor by its flattened key.
pub fn lookup(key: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Icon for a timeline event type, if the type is recognized.
pub fn timeline_icon(event_type: &str) -> Option<&'static str> {
    TIMELINE_ICONS
        .iter()
        .find(|(t, _)| *t == event_type)
        .map(|(_, icon)| *icon)
}

/// Human-readable label for a raw `mode_name` code. Unrecognized codes
/// pass through unchanged at the call site.
pub fn mode_label(raw: &str) -> Option<&'static str> {
    match raw {
        "SMG" => Some("Smart Grid"),
        "BUP" => Some("Backup"),
        "100" => Some("On Grid"),
        "150" => Some("Off Grid"),
        _ => None,
    }
}

/// Icons for timeline event records, by event type.
pub const TIMELINE_ICONS: &[(&str, &str)] = &[
    ("com_lost", "mdi:lan-disconnect"),
    ("com_ok", "mdi:lan-connect"),
    ("warning_grid", "mdi:alert-circle"),
    ("warning_ond", "mdi:alert-circle"),
    ("warning_soft", "mdi:alert-circle"),
    ("warning_pv", "mdi:alert-circle"),
    ("warning_bat", "mdi:alert-circle"),
    ("warning_cpu", "mdi:alert-circle"),
    ("warning_spe", "mdi:alert-circle"),
    ("error_grid", "mdi:close-octagon"),
    ("error_ond", "mdi:close-octagon"),
    ("error_soft", "mdi:close-octagon"),
    ("error_pv", "mdi:close-octagon"),
    ("error_bat", "mdi:close-octagon"),
    ("error_spe", "mdi:close-octagon-outline"),
    ("info_grid", "mdi:information-slab-circle"),
    ("info_ond", "mdi:information-slab-circle"),
    ("info_soft", "mdi:information-slab-circle"),
    ("info_pv", "mdi:information-slab-circle"),
    ("info_bat", "mdi:information-slab-circle"),
    ("info_cpu", "mdi:information-slab-circle"),
    ("info_spe", "mdi:information-slab-circle"),
    ("warning_???", "mdi:alert"),
    ("warnings", "mdi:alert"),
    ("error_???", "mdi:close-octagon"),
    ("errors", "mdi:close-octagon"),
    ("good_1", "mdi:check-circle"),
    ("good_2", "mdi:check-circle"),
    ("good_3", "mdi:check-circle"),
];
