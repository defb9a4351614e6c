//! Application-level utilities for the Pastebox CLI.
//!
//! This module provides:
//! - Path resolution for the config file
//! - Lazily loaded configuration and store opening
//! - Exit helpers for expected failures

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::{exit_invalid_input, exit_not_found_with_hint, parse_id};
