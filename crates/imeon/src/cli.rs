//! Clap derive structures for the `imeon` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// imeon -- poll and control Imeon solar inverters from the command line
#[derive(Debug, Parser)]
#[command(
    name = "imeon",
    version,
    about = "Bridge to Imeon solar inverters on the local network",
    long_about = "Polls one or more Imeon inverters over their local HTTP API, \
        renders their state as sensor entities, and dispatches control actions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path (default: platform config dir)
    #[arg(long, env = "IMEON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configured devices
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Poll device(s) on the fixed 1-minute cadence, printing changes
    Watch {
        /// Device label (default: every configured device)
        label: Option<String>,
    },

    /// One-shot state snapshot of a device
    #[command(alias = "st")]
    Status {
        /// Device label (default: the configured default device)
        label: Option<String>,
    },

    /// Invoke a control action on a device
    Set {
        /// Device label
        label: String,

        /// Action key (see `imeon actions`)
        action: String,

        /// Action arguments, in descriptor order
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// List every readable field
    Fields,

    /// List every control action and its argument schema
    Actions,
}

// ── Config subcommands ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Register a new device (guided prompts for missing flags)
    Add {
        /// Device label -- permanent identifier, immutable after creation
        label: Option<String>,

        /// Network address (bare host, host:port, or URL)
        #[arg(long)]
        address: Option<String>,

        /// API username
        #[arg(long)]
        username: Option<String>,

        /// API password (prefer IMEON_PASSWORD or the keyring)
        #[arg(long)]
        password: Option<String>,
    },

    /// Edit a device's connection settings (label stays fixed)
    Edit {
        /// Device label
        label: String,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// List configured devices
    #[command(alias = "ls")]
    List,

    /// Remove a device
    Remove {
        /// Device label
        label: String,
    },
}
