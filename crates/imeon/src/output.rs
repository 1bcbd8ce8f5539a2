//! Table rendering for registry listings and entity snapshots.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use imeon_core::command::{ArgKind, ArgSpec, CommandDescriptor};
use imeon_core::entity::{SensorEntity, TextEntity};
use imeon_core::fields::{FieldDescriptor, FieldKind};

// ── Field listing ────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "KEY")]
    key: &'static str,
    #[tabled(rename = "NAME")]
    name: &'static str,
    #[tabled(rename = "KIND")]
    kind: &'static str,
    #[tabled(rename = "UNIT")]
    unit: &'static str,
}

pub fn render_fields(fields: &[FieldDescriptor]) -> String {
    let rows: Vec<FieldRow> = fields
        .iter()
        .map(|f| match f.kind {
            FieldKind::Numeric { unit } => FieldRow {
                key: f.key,
                name: f.name,
                kind: "numeric",
                unit,
            },
            FieldKind::Text => FieldRow {
                key: f.key,
                name: f.name,
                kind: "text",
                unit: "",
            },
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

// ── Action listing ───────────────────────────────────────────────────

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ACTION")]
    key: &'static str,
    #[tabled(rename = "ARGUMENTS")]
    arguments: String,
    #[tabled(rename = "EXAMPLE")]
    example: String,
    #[tabled(rename = "DESCRIPTION")]
    description: &'static str,
}

fn describe_arg(spec: &ArgSpec) -> String {
    match spec.kind {
        ArgKind::Choice(values) => format!("{} in {{{}}}", spec.name, values.join(", ")),
        ArgKind::Int { min, max } => format!("{}: int {min}..={max}", spec.name),
        ArgKind::IntChoice(values) => {
            let values: Vec<String> = values.iter().map(ToString::to_string).collect();
            format!("{} in {{{}}}", spec.name, values.join(", "))
        }
        ArgKind::Bool => format!("{}: bool", spec.name),
    }
}

pub fn render_actions(descriptors: &[CommandDescriptor]) -> String {
    let rows: Vec<ActionRow> = descriptors
        .iter()
        .map(|d| {
            let arguments = d
                .args
                .iter()
                .map(describe_arg)
                .collect::<Vec<_>>()
                .join(", ");
            let example = format!(
                "{} {}",
                d.key,
                d.args
                    .iter()
                    .map(|a| a.example)
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            ActionRow {
                key: d.key,
                arguments,
                example,
                description: d.description,
            }
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

// ── Entity snapshot ──────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ENTITY")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "UNIT")]
    unit: &'static str,
}

pub fn render_entities(sensors: &[SensorEntity], texts: &[TextEntity]) -> String {
    let unavailable = || "unavailable".dimmed().to_string();

    let mut rows: Vec<EntityRow> = sensors
        .iter()
        .map(|s| EntityRow {
            name: s.name.to_owned(),
            value: s.value().map_or_else(unavailable, |v| v.to_string()),
            unit: s.unit,
        })
        .collect();

    rows.extend(texts.iter().map(|t| EntityRow {
        name: t.name.to_owned(),
        value: t.value().map_or_else(unavailable, ToOwned::to_owned),
        unit: "",
    }));

    Table::new(rows).with(Style::sharp()).to_string()
}

/// Section header for multi-device output.
pub fn device_header(label: &str, title: &str) -> String {
    if label == title {
        format!("{}", label.bold())
    } else {
        format!("{} ({})", title.bold(), label)
    }
}
