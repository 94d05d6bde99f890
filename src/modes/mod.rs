// src/modes/mod.rs

//! Execution modes and the dispatcher that picks one.
//!
//! - [`repl`]: one invocation per stdin line.
//! - [`stdin_script`]: all of stdin is a single script.
//! - [`named_command`]: run a command by name, optionally streaming stdin
//!   into it line by line.
//!
//! Every run goes through [`run_registered`] or registers by hand, so the
//! cancellation slot only ever holds the invocation currently executing.

pub mod named_command;
pub mod repl;
pub mod stdin_script;

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::cancel::CancellationCoordinator;
use crate::cli::CliArgs;
use crate::config::{Configuration, validate_mode};
use crate::decode::TextEncoding;
use crate::engine::{Engine, Invocation, InvocationStatus};
use crate::errors::{HostError, Result};
use crate::output::{OutputMultiplexer, discard};
use crate::pipeline::{self, CHANNEL_CAPACITY, PipelineReader};

/// Which execution shape was selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No command token: read-eval loop over stdin lines.
    Repl,
    /// Command token `-`: stdin is the script.
    StdinScript { args: Vec<String> },
    NamedCommand { name: String, args: Vec<String> },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Repl => "repl",
            Mode::StdinScript { .. } => "stdin-script",
            Mode::NamedCommand { .. } => "named-command",
        }
    }
}

pub type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
pub type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// The host's standard streams plus the encoding used to decode stdin.
pub struct Console {
    pub stdin: BoxedReader,
    pub stdout: BoxedWriter,
    pub stderr: BoxedWriter,
    pub encoding: TextEncoding,
}

impl Console {
    pub fn new(
        stdin: BoxedReader,
        stdout: BoxedWriter,
        stderr: BoxedWriter,
        encoding: TextEncoding,
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
            encoding,
        }
    }

    /// The real process streams, decoding stdin with the console encoding.
    pub fn process() -> Self {
        Self::new(
            Box::new(tokio::io::stdin()),
            Box::new(tokio::io::stdout()),
            Box::new(tokio::io::stderr()),
            TextEncoding::console_input(),
        )
    }
}

/// Shared, read-only state for the mode bodies.
pub struct ModeContext<'a, E> {
    pub engine: &'a E,
    pub config: Arc<Configuration>,
    pub coordinator: &'a CancellationCoordinator,
}

/// Where an invocation's output channel ends up.
pub struct OutputSinks<'a> {
    stdout: &'a mut (dyn AsyncWrite + Unpin + Send),
    stderr: &'a mut (dyn AsyncWrite + Unpin + Send),
    as_string: bool,
}

impl<'a> OutputSinks<'a> {
    pub fn new(
        stdout: &'a mut (dyn AsyncWrite + Unpin + Send),
        stderr: &'a mut (dyn AsyncWrite + Unpin + Send),
        as_string: bool,
    ) -> Self {
        Self {
            stdout,
            stderr,
            as_string,
        }
    }

    /// Multiplex to stdout/stderr with `-OutputString`, otherwise just drain.
    pub async fn drain(&mut self, output: PipelineReader) -> Result<()> {
        if self.as_string {
            OutputMultiplexer::new(&mut *self.stdout, &mut *self.stderr)
                .pump(output)
                .await?;
        } else {
            discard(output).await;
        }
        Ok(())
    }
}

/// Validate the mode against the configuration and run it.
pub async fn dispatch<E: Engine>(
    engine: &E,
    args: CliArgs,
    console: &mut Console,
    coordinator: &CancellationCoordinator,
) -> Result<()> {
    let CliArgs { config, mode } = args;
    validate_mode(&mode, &config)?;

    info!(mode = mode.name(), encoding = %console.encoding, "dispatching");
    let ctx = ModeContext {
        engine,
        config: Arc::new(config),
        coordinator,
    };

    match mode {
        Mode::Repl => repl::run(&ctx, console).await,
        Mode::StdinScript { args } => stdin_script::run(&ctx, console, args).await,
        Mode::NamedCommand { name, args } => named_command::run(&ctx, console, name, args).await,
    }
}

/// Run `invocation` in place, registered for cancellation, with a fresh
/// output channel drained into `sinks`.
///
/// Raises [`HostError::Canceled`] if an interrupt arrived during the run,
/// whatever status the invocation itself reported.
pub async fn run_registered<I: Invocation>(
    coordinator: &CancellationCoordinator,
    invocation: &mut I,
    input: PipelineReader,
    sinks: &mut OutputSinks<'_>,
) -> Result<InvocationStatus> {
    let (output_tx, output_rx) = pipeline::channel(CHANNEL_CAPACITY);
    let registration = coordinator.register(invocation.handle());

    let (status, drained) = tokio::join!(invocation.run(input, output_tx), sinks.drain(output_rx));

    let canceled = registration.finish();
    if canceled {
        return Err(HostError::Canceled);
    }
    drained?;
    debug!(?status, "invocation finished");
    Ok(status)
}
