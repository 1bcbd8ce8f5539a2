//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use imeon_config::ConfigError;
use imeon_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{label}' is not configured")]
    #[diagnostic(
        code(imeon::device_not_found),
        help("Run: imeon config list\nRegister a device with: imeon config add")
    )]
    DeviceNotFound { label: String },

    #[error("A device named '{label}' already exists")]
    #[diagnostic(
        code(imeon::duplicate_device),
        help("Labels are permanent identifiers. Use: imeon config edit {label}")
    )]
    DuplicateDevice { label: String },

    #[error("No devices configured")]
    #[diagnostic(code(imeon::no_devices), help("Register one with: imeon config add"))]
    NoDevices,

    // ── Credentials ──────────────────────────────────────────────────
    #[error("No password configured for device '{label}'")]
    #[diagnostic(
        code(imeon::no_credentials),
        help(
            "Set the IMEON_PASSWORD environment variable, store a keyring entry,\n\
             or re-run: imeon config edit {label} --password <pw>"
        )
    )]
    NoCredentials { label: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(imeon::auth_failed),
        help("Check the username and password for this device.")
    )]
    AuthFailed { message: String },

    // ── Device API ───────────────────────────────────────────────────
    #[error("Device request timed out")]
    #[diagnostic(
        code(imeon::timeout),
        help("Check the device address and that the inverter is reachable on the LAN.")
    )]
    Timeout,

    #[error("Device API error: {message}")]
    #[diagnostic(code(imeon::api_error))]
    Api { message: String },

    // ── Actions ──────────────────────────────────────────────────────
    #[error("Unknown action '{name}'")]
    #[diagnostic(code(imeon::unknown_action), help("List actions with: imeon actions"))]
    UnknownAction { name: String },

    #[error("Invalid argument for '{command}': {message}")]
    #[diagnostic(
        code(imeon::invalid_argument),
        help("Check the argument schema with: imeon actions")
    )]
    InvalidArgument { command: String, message: String },

    #[error("Action '{command}' failed on the device")]
    #[diagnostic(
        code(imeon::action_failed),
        help("The device rejected the command or did not answer; see the log above.")
    )]
    ActionFailed { command: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(imeon::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(imeon::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound { .. } | Self::NoDevices | Self::UnknownAction { .. } => {
                exit_code::NOT_FOUND
            }
            Self::DuplicateDevice { .. } => exit_code::CONFLICT,
            Self::NoCredentials { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Api { .. } => exit_code::CONNECTION,
            Self::InvalidArgument { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Error mappings ───────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CoordinatorNotFound { id } => Self::DeviceNotFound { label: id },
            CoreError::UnknownCommand(name) => Self::UnknownAction { name },
            CoreError::InvalidArgument { command, message } => Self::InvalidArgument {
                command: command.to_owned(),
                message,
            },
            CoreError::Api(api) => {
                if api.is_timeout() {
                    Self::Timeout
                } else if api.is_auth_expired() {
                    Self::AuthFailed {
                        message: api.to_string(),
                    }
                } else {
                    Self::Api {
                        message: api.to_string(),
                    }
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownDevice { label } => Self::DeviceNotFound { label },
            ConfigError::DuplicateDevice { label } => Self::DuplicateDevice { label },
            ConfigError::NoCredentials { label } => Self::NoCredentials { label },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
