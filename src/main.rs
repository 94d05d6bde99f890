// src/main.rs

use std::process::ExitCode;

use scripthost::{cli, logging, run};

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("scripthost: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run_main());

    // A stdin read can still be parked on a blocking thread (streaming mode
    // whose command exited without draining input). Don't wait for it.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("scripthost: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    logging::init_logging()?;
    let args = cli::parse()?;
    run(args).await?;
    Ok(())
}
