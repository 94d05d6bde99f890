// src/lib.rs

pub mod cancel;
pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod feeder;
pub mod logging;
pub mod modes;
pub mod output;
pub mod pipeline;
pub mod types;

use tracing::debug;

use crate::cancel::{CancellationCoordinator, spawn_interrupt_listener};
use crate::cli::CliArgs;
use crate::errors::Result;
use crate::exec::ShellEngine;
use crate::modes::{Console, dispatch};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the process streams (stdin decoded with the console encoding)
/// - the cancellation coordinator and its Ctrl-C listener
/// - the shell-backed engine
/// - the mode selected on the command line
pub async fn run(args: CliArgs) -> Result<()> {
    let coordinator = CancellationCoordinator::new();
    let listener = spawn_interrupt_listener(coordinator.clone());

    let engine = ShellEngine::new();
    let mut console = Console::process();

    let result = dispatch(&engine, args, &mut console, &coordinator).await;

    listener.abort();
    debug!(ok = result.is_ok(), "dispatch returned");
    result
}
