//! `imeon config` -- the setup and options flows.
//!
//! `add` registers a device under a permanent label; `edit` replaces
//! address/credentials for an existing label (pre-filled with current
//! values); the label itself never changes.

use dialoguer::{Confirm, Input, Password};
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use imeon_config::DeviceProfile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Add {
            label,
            address,
            username,
            password,
        } => add(global, label, address, username, password),
        ConfigCommand::Edit {
            label,
            address,
            username,
            password,
        } => edit(global, &label, address, username, password),
        ConfigCommand::List => list(global),
        ConfigCommand::Remove { label } => remove(global, &label),
    }
}

fn add(
    global: &GlobalOpts,
    label: Option<String>,
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<(), CliError> {
    let mut config = util::load_config(global)?;

    let label = match label {
        Some(l) => l,
        None => prompt_text("Device label", None)?,
    };
    let address = match address {
        Some(a) => a,
        None => prompt_text("Device address", None)?,
    };
    let username = match username {
        Some(u) => u,
        None => prompt_text("Username", None)?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(dialoguer_io)?,
    };

    if password.trim().is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "must not be empty".into(),
        });
    }

    config.add_device(
        &label,
        DeviceProfile {
            address,
            username,
            password: Some(password),
        },
    )?;
    util::save_config(global, &config)?;

    println!("Device '{}' registered.", label.bold());
    Ok(())
}

fn edit(
    global: &GlobalOpts,
    label: &str,
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<(), CliError> {
    let mut config = util::load_config(global)?;
    let current = config.device(label)?.clone();

    let address = match address {
        Some(a) => a,
        None => prompt_text("Device address", Some(&current.address))?,
    };
    let username = match username {
        Some(u) => u,
        None => prompt_text("Username", Some(&current.username))?,
    };
    let password = match password {
        Some(p) => Some(p),
        None => {
            let entered = Password::new()
                .with_prompt("Password (empty keeps current)")
                .allow_empty_password(true)
                .interact()
                .map_err(dialoguer_io)?;
            if entered.is_empty() {
                current.password.clone()
            } else {
                Some(entered)
            }
        }
    };

    config.edit_device(
        label,
        DeviceProfile {
            address,
            username,
            password,
        },
    )?;
    util::save_config(global, &config)?;

    println!(
        "Device '{}' updated; the session will be re-established on the next refresh.",
        label.bold()
    );
    Ok(())
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "USERNAME")]
    username: String,
    #[tabled(rename = "DEFAULT")]
    default: &'static str,
}

fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load_config(global)?;

    if config.devices.is_empty() {
        println!("No devices configured. Register one with: imeon config add");
        return Ok(());
    }

    let rows: Vec<DeviceRow> = config
        .labels()
        .into_iter()
        .map(|label| {
            let profile = &config.devices[label];
            DeviceRow {
                label: label.to_owned(),
                address: profile.address.clone(),
                username: profile.username.clone(),
                default: if config.default_device.as_deref() == Some(label) {
                    "*"
                } else {
                    ""
                },
            }
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn remove(global: &GlobalOpts, label: &str) -> Result<(), CliError> {
    let mut config = util::load_config(global)?;
    config.device(label)?;

    let confirmed = Confirm::new()
        .with_prompt(format!("Remove device '{label}'?"))
        .default(false)
        .interact()
        .map_err(dialoguer_io)?;
    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    config.remove_device(label)?;
    util::save_config(global, &config)?;

    println!("Device '{}' removed.", label.bold());
    Ok(())
}

fn prompt_text(prompt: &str, initial: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input.interact_text().map_err(dialoguer_io)
}

fn dialoguer_io(err: dialoguer::Error) -> CliError {
    match err {
        dialoguer::Error::IO(io) => CliError::Io(io),
    }
}
