// ── Command API ──
//
// All control operations flow through one `Command` enum with typed
// arguments. The static descriptor table carries the argument schema
// (bounds, allowed sets, examples) for listings and for building
// validated commands from raw CLI strings. Dispatch resolves the
// coordinator by device label and routes the variant to the matching
// client setter; invocation failures are reported in the response
// payload, never propagated.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::CoreError;
use crate::registry::CoordinatorRegistry;

/// Allowed operating modes for `inverter_mode`.
pub const MODES: &[&str] = &["smg", "bup", "ong", "ofg"];

/// Allowed LCD backlight times (minutes) for `lcd_time`.
pub const LCD_TIMES: &[i64] = &[0, 1, 2, 10, 20];

const MPPT_LOW_MIN: i64 = 350;
const MPPT_HIGH_MAX: i64 = 700;
const INJECTION_MAX: i64 = 8000;

/// All control operations against an inverter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the operating mode (smart-grid, backup, on-grid, off-grid).
    InverterMode { mode: String },
    /// Set the MPPT voltage tracking range.
    Mppt { low: i64, high: i64 },
    /// Enable or disable grid feed-in.
    FeedIn { active: bool },
    /// Cap the grid injection power in watts.
    InjectionPower { limit: i64 },
    /// LCD backlight time in minutes (0 = always on).
    LcdTime { time: i64 },
    /// Enable or disable night battery discharge.
    NightDischarge { active: bool },
    /// Enable or disable battery charging from the grid.
    GridCharge { active: bool },
    /// Switch the auxiliary relay.
    Relay { active: bool },
    /// Enable or disable the AC output.
    AcOutput { active: bool },
}

impl Command {
    /// The stable command key, matching the descriptor table.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InverterMode { .. } => "inverter_mode",
            Self::Mppt { .. } => "mppt",
            Self::FeedIn { .. } => "feed_in",
            Self::InjectionPower { .. } => "injection_power",
            Self::LcdTime { .. } => "lcd_time",
            Self::NightDischarge { .. } => "night_discharge",
            Self::GridCharge { .. } => "grid_charge",
            Self::Relay { .. } => "relay",
            Self::AcOutput { .. } => "ac_output",
        }
    }

    /// Check every argument against its bounds/allowed set.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |message: String| CoreError::InvalidArgument {
            command: self.name(),
            message,
        };

        match self {
            Self::InverterMode { mode } => {
                if MODES.contains(&mode.as_str()) {
                    Ok(())
                } else {
                    Err(invalid(format!(
                        "mode must be one of {}, got `{mode}`",
                        MODES.join(", ")
                    )))
                }
            }
            Self::Mppt { low, high } => {
                if *low < MPPT_LOW_MIN {
                    return Err(invalid(format!("low must be >= {MPPT_LOW_MIN}, got {low}")));
                }
                if *high > MPPT_HIGH_MAX {
                    return Err(invalid(format!(
                        "high must be <= {MPPT_HIGH_MAX}, got {high}"
                    )));
                }
                if low > high {
                    return Err(invalid(format!("low ({low}) must not exceed high ({high})")));
                }
                Ok(())
            }
            Self::InjectionPower { limit } => {
                if (0..=INJECTION_MAX).contains(limit) {
                    Ok(())
                } else {
                    Err(invalid(format!(
                        "limit must be in 0..={INJECTION_MAX}, got {limit}"
                    )))
                }
            }
            Self::LcdTime { time } => {
                if LCD_TIMES.contains(time) {
                    Ok(())
                } else {
                    Err(invalid(format!(
                        "time must be one of {LCD_TIMES:?}, got {time}"
                    )))
                }
            }
            Self::FeedIn { .. }
            | Self::NightDischarge { .. }
            | Self::GridCharge { .. }
            | Self::Relay { .. }
            | Self::AcOutput { .. } => Ok(()),
        }
    }

    /// Build a validated command from its key and raw string arguments.
    ///
    /// Each (key, args) pair yields an independent value -- no shared
    /// state between builds.
    pub fn from_args(key: &str, args: &[String]) -> Result<Self, CoreError> {
        let descriptor =
            descriptor(key).ok_or_else(|| CoreError::UnknownCommand(key.to_owned()))?;

        if args.len() != descriptor.args.len() {
            return Err(CoreError::InvalidArgument {
                command: descriptor.key,
                message: format!(
                    "expected {} argument(s) ({}), got {}",
                    descriptor.args.len(),
                    descriptor
                        .args
                        .iter()
                        .map(|a| a.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                    args.len()
                ),
            });
        }

        let command = match descriptor.key {
            "inverter_mode" => Self::InverterMode {
                mode: args[0].to_lowercase(),
            },
            "mppt" => Self::Mppt {
                low: parse_int("mppt", "low", &args[0])?,
                high: parse_int("mppt", "high", &args[1])?,
            },
            "feed_in" => Self::FeedIn {
                active: parse_bool("feed_in", "active", &args[0])?,
            },
            "injection_power" => Self::InjectionPower {
                limit: parse_int("injection_power", "limit", &args[0])?,
            },
            "lcd_time" => Self::LcdTime {
                time: parse_int("lcd_time", "time", &args[0])?,
            },
            "night_discharge" => Self::NightDischarge {
                active: parse_bool("night_discharge", "active", &args[0])?,
            },
            "grid_charge" => Self::GridCharge {
                active: parse_bool("grid_charge", "active", &args[0])?,
            },
            "relay" => Self::Relay {
                active: parse_bool("relay", "active", &args[0])?,
            },
            "ac_output" => Self::AcOutput {
                active: parse_bool("ac_output", "active", &args[0])?,
            },
            other => return Err(CoreError::UnknownCommand(other.to_owned())),
        };

        command.validate()?;
        Ok(command)
    }
}

fn parse_int(command: &'static str, name: &str, raw: &str) -> Result<i64, CoreError> {
    raw.parse().map_err(|_| CoreError::InvalidArgument {
        command,
        message: format!("{name} must be an integer, got `{raw}`"),
    })
}

fn parse_bool(command: &'static str, name: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.to_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(CoreError::InvalidArgument {
            command,
            message: format!("{name} must be true/false, got `{raw}`"),
        }),
    }
}

// ── Descriptors ─────────────────────────────────────────────────────

/// Argument value schema.
#[derive(Debug, Clone, Copy)]
pub enum ArgKind {
    /// One of a fixed set of string values.
    Choice(&'static [&'static str]),
    /// Integer within an inclusive range.
    Int { min: i64, max: i64 },
    /// One of a fixed set of integer values.
    IntChoice(&'static [i64]),
    Bool,
}

/// One positional argument of a command.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub example: &'static str,
}

/// Display and validation metadata for one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Positional argument specs, in invocation order.
    pub args: &'static [ArgSpec],
}

/// Every control command, in listing order.
pub const DESCRIPTORS: &[CommandDescriptor] = &[
    CommandDescriptor {
        key: "inverter_mode",
        name: "Inverter Mode",
        description: "Switch the inverter operating mode",
        args: &[ArgSpec {
            name: "mode",
            kind: ArgKind::Choice(MODES),
            example: "smg",
        }],
    },
    CommandDescriptor {
        key: "mppt",
        name: "MPPT Range",
        description: "Set the MPPT voltage tracking range",
        args: &[
            ArgSpec {
                name: "low",
                kind: ArgKind::Int {
                    min: MPPT_LOW_MIN,
                    max: MPPT_HIGH_MAX,
                },
                example: "350",
            },
            ArgSpec {
                name: "high",
                kind: ArgKind::Int {
                    min: MPPT_LOW_MIN,
                    max: MPPT_HIGH_MAX,
                },
                example: "700",
            },
        ],
    },
    CommandDescriptor {
        key: "feed_in",
        name: "Grid Feed-In",
        description: "Enable or disable feeding power into the grid",
        args: &[ArgSpec {
            name: "active",
            kind: ArgKind::Bool,
            example: "true",
        }],
    },
    CommandDescriptor {
        key: "injection_power",
        name: "Injection Power Limit",
        description: "Cap the grid injection power in watts",
        args: &[ArgSpec {
            name: "limit",
            kind: ArgKind::Int {
                min: 0,
                max: INJECTION_MAX,
            },
            example: "3000",
        }],
    },
    CommandDescriptor {
        key: "lcd_time",
        name: "LCD Time",
        description: "LCD backlight time in minutes (0 = always on)",
        args: &[ArgSpec {
            name: "time",
            kind: ArgKind::IntChoice(LCD_TIMES),
            example: "10",
        }],
    },
    CommandDescriptor {
        key: "night_discharge",
        name: "Night Discharge",
        description: "Enable or disable night battery discharge",
        args: &[ArgSpec {
            name: "active",
            kind: ArgKind::Bool,
            example: "false",
        }],
    },
    CommandDescriptor {
        key: "grid_charge",
        name: "Grid Charge",
        description: "Enable or disable battery charging from the grid",
        args: &[ArgSpec {
            name: "active",
            kind: ArgKind::Bool,
            example: "true",
        }],
    },
    CommandDescriptor {
        key: "relay",
        name: "Relay",
        description: "Switch the auxiliary relay",
        args: &[ArgSpec {
            name: "active",
            kind: ArgKind::Bool,
            example: "true",
        }],
    },
    CommandDescriptor {
        key: "ac_output",
        name: "AC Output",
        description: "Enable or disable the AC output",
        args: &[ArgSpec {
            name: "active",
            kind: ArgKind::Bool,
            example: "true",
        }],
    },
];

/// Look up a command descriptor by key.
pub fn descriptor(key: &str) -> Option<&'static CommandDescriptor> {
    DESCRIPTORS.iter().find(|d| d.key == key)
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Result payload of one command invocation.
///
/// `result` carries the device's raw response value on success, or the
/// literal string `"failed"` when the invocation errored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionResponse {
    pub result: Value,
}

impl ActionResponse {
    pub fn failed() -> Self {
        Self {
            result: Value::String("failed".to_owned()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.result == Value::String("failed".to_owned())
    }
}

/// Dispatch one command to the device registered under `id`.
///
/// Lookup of an unknown label and argument validation surface as `Err`;
/// device-side failures (timeout or otherwise) are logged and reported
/// as a `"failed"` response, never propagated.
pub async fn dispatch(
    registry: &CoordinatorRegistry,
    id: &str,
    command: &Command,
) -> Result<ActionResponse, CoreError> {
    command.validate()?;
    let coordinator = registry.lookup(id)?;

    debug!(device = %id, command = command.name(), args = ?command, "dispatching command");

    match coordinator.invoke(command).await {
        Ok(result) => {
            info!(device = %id, command = command.name(), ?result, "command succeeded");
            Ok(ActionResponse { result })
        }
        Err(error) => {
            error!(device = %id, command = command.name(), %error, "command failed");
            Ok(ActionResponse::failed())
        }
    }
}
