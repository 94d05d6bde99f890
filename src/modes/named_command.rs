// src/modes/named_command.rs

use anyhow::anyhow;
use tracing::info;

use crate::decode::LineDecoder;
use crate::engine::{Engine, Invocation};
use crate::errors::{HostError, Result};
use crate::feeder::feed;
use crate::pipeline::{self, CHANNEL_CAPACITY};

use super::{Console, ModeContext, OutputSinks, run_registered};

/// Run `name` with `args`.
///
/// With `-InputString` the invocation runs on its own task while stdin is
/// decoded and streamed into it; the mode waits for both before checking for
/// cancellation.
pub async fn run<E: Engine>(
    ctx: &ModeContext<'_, E>,
    console: &mut Console,
    name: String,
    args: Vec<String>,
) -> Result<()> {
    info!(command = %name, args = args.len(), streaming = ctx.config.input_as_stream, "running named command");

    let mut invocation = ctx.engine.create(ctx.config.clone());
    invocation.set_command(name);
    for arg in args {
        invocation.add_argument(arg);
    }

    let Console {
        stdin,
        stdout,
        stderr,
        encoding,
    } = console;
    let mut sinks = OutputSinks::new(&mut **stdout, &mut **stderr, ctx.config.output_as_string);

    if !ctx.config.input_as_stream {
        let status =
            run_registered(ctx.coordinator, &mut invocation, pipeline::completed(), &mut sinks)
                .await?;
        info!(?status, "named command finished");
        return Ok(());
    }

    let stop = invocation.stop_signal().subscribe();
    let registration = ctx.coordinator.register(invocation.handle());

    let (input_tx, input_rx) = pipeline::channel(CHANNEL_CAPACITY);
    let (output_tx, output_rx) = pipeline::channel(CHANNEL_CAPACITY);

    let running = invocation.run_async(input_rx, output_tx);
    let decoder = LineDecoder::new(stdin, *encoding);

    let (joined, fed, drained) = tokio::join!(
        running,
        feed(decoder, input_tx, stop),
        sinks.drain(output_rx)
    );

    let canceled = registration.finish();
    if canceled {
        return Err(HostError::Canceled);
    }

    let status = joined.map_err(|e| anyhow!("invocation task failed: {e}"))?;
    let report = fed?;
    drained?;
    info!(?status, lines = report.lines, end = ?report.end, "streamed named command finished");
    Ok(())
}
