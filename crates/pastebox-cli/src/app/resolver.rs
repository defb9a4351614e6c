//! Path resolution and exit helpers.

use std::path::PathBuf;

use pastebox_core::{PasteError, PasteId};

use crate::config::default_config_path;
use crate::constants::exit_codes;

/// Resolve the config file path, checking PASTEBOX_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("PASTEBOX_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Parse an ID argument, exiting with `INVALID_INPUT` if it is malformed.
pub fn parse_id(value: &str) -> PasteId {
    match PasteId::parse(value) {
        Ok(id) => id,
        Err(PasteError::InvalidId(reason)) => exit_invalid_input(&reason),
        Err(err) => exit_invalid_input(&err.to_string()),
    }
}

/// Exit with error code for not found errors.
pub fn exit_not_found_with_hint(message: &str, hint: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", hint);
    std::process::exit(exit_codes::NOT_FOUND);
}

/// Exit with error code for invalid input.
pub fn exit_invalid_input(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(exit_codes::INVALID_INPUT);
}
