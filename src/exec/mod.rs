// src/exec/mod.rs

//! Process-backed engine.
//!
//! [`ShellEngine`] implements the [`Engine`](crate::engine::Engine) protocol
//! on top of `tokio::process::Command`:
//! - scripts run through the platform shell (`sh -c` / `cmd /C`)
//! - named commands are spawned directly with their positional arguments
//! - the input channel is written to the child's stdin
//! - with `-OutputString`, child stdout/stderr become text items and error
//!   records; otherwise the child inherits the host's streams

pub mod shell;

pub use shell::{ShellEngine, ShellInvocation};
