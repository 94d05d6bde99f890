// src/modes/repl.rs

use tracing::{debug, info};

use crate::decode::LineDecoder;
use crate::engine::{Engine, Invocation, InvocationStatus};
use crate::errors::Result;
use crate::pipeline;

use super::{Console, ModeContext, OutputSinks, run_registered};

/// One fresh invocation per stdin line until end-of-input.
///
/// A failing line does not end the loop; an interrupt does.
pub async fn run<E: Engine>(ctx: &ModeContext<'_, E>, console: &mut Console) -> Result<()> {
    let Console {
        stdin,
        stdout,
        stderr,
        encoding,
    } = console;
    let mut decoder = LineDecoder::new(stdin, *encoding);
    let mut sinks = OutputSinks::new(&mut **stdout, &mut **stderr, ctx.config.output_as_string);

    let mut ran = 0usize;
    let mut failed = 0usize;

    while let Some(line) = decoder.next_line().await? {
        let mut invocation = ctx.engine.create(ctx.config.clone());
        invocation.set_script(line);

        let status =
            run_registered(ctx.coordinator, &mut invocation, pipeline::completed(), &mut sinks)
                .await?;
        ran += 1;
        if status != InvocationStatus::Completed {
            failed += 1;
            debug!(line = ran, ?status, "repl line did not complete successfully");
        }
    }

    info!(ran, failed, "repl reached end of input");
    Ok(())
}
