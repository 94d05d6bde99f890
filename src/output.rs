// src/output.rs

//! Routing of output items to the host's stdout/stderr.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

use crate::errors::Result;
use crate::pipeline::{PipelineItem, PipelineReader};

/// Writes text items to stdout and error records to stderr as they arrive.
///
/// Every other item kind is skipped. Each write is flushed straight away so
/// nothing is held back behind a buffer.
pub struct OutputMultiplexer<'a> {
    stdout: &'a mut (dyn AsyncWrite + Unpin + Send),
    stderr: &'a mut (dyn AsyncWrite + Unpin + Send),
}

impl<'a> OutputMultiplexer<'a> {
    pub fn new(
        stdout: &'a mut (dyn AsyncWrite + Unpin + Send),
        stderr: &'a mut (dyn AsyncWrite + Unpin + Send),
    ) -> Self {
        Self { stdout, stderr }
    }

    /// Drain `output` until the invocation completes it.
    pub async fn pump(&mut self, mut output: PipelineReader) -> Result<usize> {
        let mut written = 0usize;
        while let Some(item) = output.recv().await {
            if self.write_item(&item).await? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Returns whether the item was written anywhere.
    pub async fn write_item(&mut self, item: &PipelineItem) -> Result<bool> {
        match item {
            PipelineItem::Text(s) => write_line(&mut *self.stdout, s).await?,
            PipelineItem::ErrorRecord(rec) => {
                write_line(&mut *self.stderr, &rec.to_string()).await?
            }
            other => {
                trace!(item = ?other, "output item ignored");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

async fn write_line(target: &mut (dyn AsyncWrite + Unpin + Send), text: &str) -> Result<()> {
    target.write_all(text.as_bytes()).await?;
    target.write_all(b"\n").await?;
    target.flush().await?;
    Ok(())
}

/// Drain `output` without writing anything; error records are still logged.
///
/// Used when `-OutputString` is off, so the engine never stalls on a full
/// output channel.
pub async fn discard(mut output: PipelineReader) {
    while let Some(item) = output.recv().await {
        match item {
            PipelineItem::ErrorRecord(rec) => {
                warn!(category = %rec.category, "{}", rec.message);
            }
            other => trace!(item = ?other, "output item discarded"),
        }
    }
}
