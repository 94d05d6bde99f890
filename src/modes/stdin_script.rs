// src/modes/stdin_script.rs

use tracing::info;

use crate::decode::read_to_text;
use crate::engine::{Engine, Invocation};
use crate::errors::Result;
use crate::pipeline;

use super::{Console, ModeContext, OutputSinks, run_registered};

/// Read all of stdin as one script and run it once with `args` as its
/// positional arguments.
pub async fn run<E: Engine>(
    ctx: &ModeContext<'_, E>,
    console: &mut Console,
    args: Vec<String>,
) -> Result<()> {
    let script = read_to_text(&mut console.stdin, console.encoding).await?;
    info!(bytes = script.len(), args = args.len(), "running script from stdin");

    let mut invocation = ctx.engine.create(ctx.config.clone());
    invocation.set_script(script);
    for arg in args {
        invocation.add_argument(arg);
    }

    let mut sinks = OutputSinks::new(
        &mut *console.stdout,
        &mut *console.stderr,
        ctx.config.output_as_string,
    );
    let status =
        run_registered(ctx.coordinator, &mut invocation, pipeline::completed(), &mut sinks).await?;
    info!(?status, "stdin script finished");
    Ok(())
}
