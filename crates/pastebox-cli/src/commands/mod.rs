//! Command handlers.

pub mod comments;
pub mod maintenance;
pub mod misc;
pub mod pastes;
