//! Command handlers.
//!
//! Each handler parses CLI-specific input, calls into `herald-core` or
//! `herald-audio`, and formats the result for the terminal.

pub mod atmospheres;
pub mod categories;
pub mod play;
pub mod settings;
