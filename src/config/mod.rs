// src/config/mod.rs

//! Host configuration.
//!
//! Responsibilities:
//! - Define the frozen configuration record handed to the engine (`model.rs`).
//! - Reject mode + flag combinations that have no coherent meaning
//!   (`validate.rs`).

pub mod model;
pub mod validate;

pub use model::{Configuration, PreferenceKind, Preferences};
pub use validate::validate_mode;
