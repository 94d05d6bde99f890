// src/engine/mod.rs

//! Engine invocation protocol.
//!
//! The host never looks inside the engine. It only:
//! - creates an invocation bound to the frozen [`Configuration`]
//! - attaches a script, or a command name plus positional arguments
//! - runs it against an input and an output [`pipeline`](crate::pipeline)
//!   channel, either awaiting it in place or spawning it
//! - asks it to stop through its [`StopSignal`]
//!
//! [`crate::exec::ShellEngine`] is the production implementation; tests swap
//! in a fake engine.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Configuration;
use crate::pipeline::{PipelineReader, PipelineWriter};

pub mod stop;

pub use stop::{InvocationHandle, StopListener, StopSignal};

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    Completed,
    /// The script/command reported failure. Details, if any, were appended
    /// to the output channel as error records.
    Failed,
    /// Ended early because a stop was requested.
    Stopped,
}

/// What an invocation executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Script(String),
    Command(String),
}

/// Factory for invocations.
pub trait Engine: Send + Sync {
    type Invocation: Invocation;

    fn create(&self, config: Arc<Configuration>) -> Self::Invocation;
}

/// One execution of a script or command.
///
/// Dropping an invocation disposes of it and releases whatever it holds.
pub trait Invocation: Send + 'static {
    fn set_script(&mut self, text: String);

    fn set_command(&mut self, name: String);

    fn add_argument(&mut self, value: String);

    /// The invocation's own stop signal; owned by the invocation.
    fn stop_signal(&self) -> &Arc<StopSignal>;

    /// Run to completion.
    ///
    /// Consumes items from `input` until it completes and appends results to
    /// `output`. `output` is completed (dropped) when the returned future
    /// resolves. Errors raised by the script itself are reported as
    /// `ErrorRecord` items, never as a panic or a Rust error.
    fn run(
        &mut self,
        input: PipelineReader,
        output: PipelineWriter,
    ) -> Pin<Box<dyn Future<Output = InvocationStatus> + Send + '_>>;

    /// Non-blocking and idempotent; safe before, during and after a run.
    fn request_stop(&self) {
        self.stop_signal().request_stop();
    }

    /// Non-owning handle for the cancellation coordinator.
    fn handle(&self) -> InvocationHandle {
        InvocationHandle::new(self.stop_signal())
    }

    /// Start the run on its own task and return immediately.
    fn run_async(self, input: PipelineReader, output: PipelineWriter) -> JoinHandle<InvocationStatus>
    where
        Self: Sized,
    {
        let mut invocation = self;
        tokio::spawn(async move { invocation.run(input, output).await })
    }
}
