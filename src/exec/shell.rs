// src/exec/shell.rs

//! Invocation backed by an OS process.

use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{Configuration, PreferenceKind};
use crate::engine::{Engine, Invocation, InvocationStatus, StopSignal, Target};
use crate::pipeline::{ErrorRecord, PipelineItem, PipelineReader, PipelineWriter};
use crate::types::ActionPreference;

/// `$0` for scripts run through the platform shell.
const SCRIPT_NAME: &str = "scripthost";

/// Engine that runs scripts through the platform shell and commands as
/// programs.
#[derive(Debug, Clone, Default)]
pub struct ShellEngine;

impl ShellEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for ShellEngine {
    type Invocation = ShellInvocation;

    fn create(&self, config: Arc<Configuration>) -> ShellInvocation {
        ShellInvocation {
            config,
            target: None,
            args: Vec::new(),
            stop: StopSignal::new(),
        }
    }
}

#[derive(Debug)]
pub struct ShellInvocation {
    config: Arc<Configuration>,
    target: Option<Target>,
    args: Vec<String>,
    stop: Arc<StopSignal>,
}

impl Invocation for ShellInvocation {
    fn set_script(&mut self, text: String) {
        self.target = Some(Target::Script(text));
    }

    fn set_command(&mut self, name: String) {
        self.target = Some(Target::Command(name));
    }

    fn add_argument(&mut self, value: String) {
        self.args.push(value);
    }

    fn stop_signal(&self) -> &Arc<StopSignal> {
        &self.stop
    }

    fn run(
        &mut self,
        input: PipelineReader,
        output: PipelineWriter,
    ) -> Pin<Box<dyn Future<Output = InvocationStatus> + Send + '_>> {
        Box::pin(async move {
            let errors = ErrorSink::new(self.config.preferences.error);
            match self.run_inner(input, &output, &errors).await {
                Ok(status) => status,
                Err(err) => {
                    error!(error = %err, "invocation failed");
                    errors
                        .emit(&output, ErrorRecord::new("InvocationFailed", format!("{err:#}")))
                        .await;
                    InvocationStatus::Failed
                }
            }
        })
    }
}

impl ShellInvocation {
    async fn run_inner(
        &mut self,
        input: PipelineReader,
        output: &PipelineWriter,
        errors: &ErrorSink,
    ) -> Result<InvocationStatus> {
        let Some(target) = self.target.clone() else {
            errors
                .emit(output, ErrorRecord::new("NoTarget", "no script or command was set"))
                .await;
            return Ok(InvocationStatus::Failed);
        };

        let policy = self.config.effective_execution_policy();
        if matches!(target, Target::Script(_)) && !policy.allows_scripts() {
            errors
                .emit(
                    output,
                    ErrorRecord::new(
                        "ScriptsDisabled",
                        format!("running scripts is disabled by execution policy {policy}"),
                    ),
                )
                .await;
            return Ok(InvocationStatus::Failed);
        }

        if self.stop.is_requested() {
            return Ok(InvocationStatus::Stopped);
        }

        let mut cmd = self.build_command(&target);
        let label = match &target {
            Target::Script(_) => "<script>".to_string(),
            Target::Command(name) => name.clone(),
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                errors
                    .emit(
                        output,
                        ErrorRecord::new(
                            "CommandNotFound",
                            format!("the term '{label}' is not recognized as a command"),
                        ),
                    )
                    .await;
                return Ok(InvocationStatus::Failed);
            }
            Err(e) => return Err(e).with_context(|| format!("spawning process for '{label}'")),
        };
        info!(target = %label, args = self.args.len(), "invocation process started");

        let feeder = child.stdin.take().map(|stdin| tokio::spawn(forward_input(input, stdin)));
        let (halt_tx, mut halt_rx) = mpsc::channel::<()>(1);
        let readers = attach_output_readers(&mut child, output, errors, halt_tx);

        let mut stop = self.stop.subscribe();
        let status = tokio::select! {
            biased;
            Some(()) = halt_rx.recv() => {
                info!(target = %label, "error action is Stop; killing invocation process");
                Exit::Killed(InvocationStatus::Failed)
            }
            _ = stop.requested() => {
                info!(target = %label, "stop requested; killing invocation process");
                Exit::Killed(InvocationStatus::Stopped)
            }
            status = child.wait() => {
                let status = status.with_context(|| format!("waiting for '{label}'"))?;
                let code = status.code().unwrap_or(-1);
                info!(target = %label, exit_code = code, success = status.success(), "invocation process exited");
                Exit::Code(code)
            }
        };

        if let Some(feeder) = feeder {
            feeder.abort();
        }

        if let Exit::Killed(_) = status {
            if let Err(e) = child.kill().await {
                warn!(target = %label, error = %e, "failed to kill invocation process");
            }
            // Grandchildren may still hold the pipes open; don't wait on them.
            for reader in readers {
                reader.abort();
            }
        } else {
            for reader in readers {
                if let Err(e) = reader.await {
                    debug!(error = %e, "output reader task ended abnormally");
                }
            }
        }

        // The child may exit before its stderr reader saw the halting record.
        if matches!(status, Exit::Code(_)) && errors.is_halted() {
            info!(target = %label, "error action is Stop; run failed after process exit");
            return Ok(InvocationStatus::Failed);
        }

        match status {
            Exit::Code(code) => {
                let _ = output.send(PipelineItem::ExitCode(code)).await;
                if code == 0 {
                    Ok(InvocationStatus::Completed)
                } else {
                    Ok(InvocationStatus::Failed)
                }
            }
            Exit::Killed(status) => Ok(status),
        }
    }

    fn build_command(&self, target: &Target) -> Command {
        let mut cmd = match target {
            Target::Script(text) => {
                let mut c = if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C").arg(text);
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c").arg(text).arg(SCRIPT_NAME);
                    c
                };
                c.args(&self.args);
                c
            }
            Target::Command(name) => {
                let mut c = Command::new(name);
                c.args(&self.args);
                c
            }
        };

        for kind in PreferenceKind::ALL {
            cmd.env(
                format!("SCRIPTHOST_{}_PREFERENCE", kind.env_name()),
                self.config.preferences.get(kind).to_string(),
            );
        }
        cmd.env(
            "SCRIPTHOST_EXECUTION_POLICY",
            self.config.effective_execution_policy().to_string(),
        );

        let (stdout, stderr) = if self.config.output_as_string {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };
        cmd.stdin(Stdio::piped())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);
        cmd
    }
}

enum Exit {
    Code(i32),
    Killed(InvocationStatus),
}

/// Applies the error-action preference to error records on their way into
/// the output channel.
///
/// Clones share the halted flag: under `Stop` only the first record gets
/// through, whichever clone sees it.
#[derive(Debug, Clone)]
struct ErrorSink {
    action: ActionPreference,
    halted: Arc<AtomicBool>,
    halt: Option<mpsc::Sender<()>>,
}

impl ErrorSink {
    fn new(action: ActionPreference) -> Self {
        Self {
            action,
            halted: Arc::new(AtomicBool::new(false)),
            halt: None,
        }
    }

    fn with_halt(&self, halt: mpsc::Sender<()>) -> Self {
        Self {
            action: self.action,
            halted: Arc::clone(&self.halted),
            halt: Some(halt),
        }
    }

    fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    async fn emit(&self, output: &PipelineWriter, record: ErrorRecord) {
        match self.action {
            ActionPreference::SilentlyContinue | ActionPreference::Ignore => {
                debug!(category = %record.category, "error record suppressed by error action");
            }
            ActionPreference::Stop => {
                if self.halted.swap(true, Ordering::SeqCst) {
                    debug!(category = %record.category, "error record dropped after halt");
                    return;
                }
                let _ = output.send(PipelineItem::ErrorRecord(record)).await;
                if let Some(halt) = &self.halt {
                    let _ = halt.try_send(());
                }
            }
            ActionPreference::Continue
            | ActionPreference::Inquire
            | ActionPreference::Suspend
            | ActionPreference::Break => {
                let _ = output.send(PipelineItem::ErrorRecord(record)).await;
            }
        }
    }
}

/// Write input items to the child's stdin, one per line, then close it.
async fn forward_input(mut input: PipelineReader, mut stdin: ChildStdin) {
    while let Some(item) = input.recv().await {
        let mut line = item.to_string().into_bytes();
        line.push(b'\n');
        if let Err(e) = stdin.write_all(&line).await {
            // Usually the child exited or closed its stdin.
            debug!(error = %e, "stopped forwarding input to invocation process");
            return;
        }
    }
    let _ = stdin.shutdown().await;
}

/// Turn piped stdout lines into text items and stderr lines into error
/// records. Nothing to do when the child inherited the host's streams.
fn attach_output_readers(
    child: &mut Child,
    output: &PipelineWriter,
    errors: &ErrorSink,
    halt: mpsc::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut readers = Vec::new();

    if let Some(stdout) = child.stdout.take() {
        let output = output.clone_sender();
        readers.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if output.send(PipelineItem::Text(line)).await.is_err() {
                    break;
                }
            }
        }));
    }

    if let Some(stderr) = child.stderr.take() {
        let output = output.clone_sender();
        let errors = errors.with_halt(halt);
        readers.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                errors.emit(&output, ErrorRecord::new("", line)).await;
            }
        }));
    }

    readers
}
