//! `imeon fields` / `imeon actions` -- static registry listings.

use imeon_core::command::DESCRIPTORS;
use imeon_core::fields::FIELDS;

use crate::error::CliError;
use crate::output;

pub fn fields() -> Result<(), CliError> {
    println!("{}", output::render_fields(FIELDS));
    Ok(())
}

pub fn actions() -> Result<(), CliError> {
    println!("{}", output::render_actions(DESCRIPTORS));
    Ok(())
}
