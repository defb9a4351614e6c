//! # Pastebox Core
//!
//! Storage backend for an encrypted-note sharing service.
//!
//! Pastes are opaque, already-encrypted payloads plus a little metadata
//! (creation time, expiration, display flags) stored under a caller-chosen
//! identifier. This crate persists them; it never looks inside the payload.
//!
//! ## Architecture
//!
//! - **id**: identifier validation and generation
//! - **storage**: the `PasteStore` trait, data types, and the sharded
//!   filesystem backend
//! - **lifecycle**: expiry predicate, clocks, and lazy reclamation
//! - **fs**: atomic write/publish primitives
//! - **config**: store settings

pub mod config;
pub mod error;
pub mod fs;
pub mod id;
pub mod lifecycle;
pub mod storage;

pub use config::StoreConfig;
pub use error::{PasteError, Result};
pub use id::PasteId;
pub use storage::{FilesystemStore, PasteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
