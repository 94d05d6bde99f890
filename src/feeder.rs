// src/feeder.rs

//! Streams decoded stdin lines into a running invocation's input channel.

use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::decode::LineDecoder;
use crate::engine::StopListener;
use crate::errors::Result;
use crate::pipeline::{PipelineItem, PipelineWriter};

/// Why feeding ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    /// The source reached end-of-input.
    Exhausted,
    /// A stop was requested on the invocation.
    Stopped,
    /// The invocation dropped its input channel.
    ConsumerGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReport {
    pub lines: usize,
    pub end: FeedEnd,
}

/// Push every line from `decoder` into `input` as a text item.
///
/// The channel is completed exactly once, whichever way feeding ends. A stop
/// requested before the first read means nothing is read at all. A read error
/// is returned after the channel has been completed.
pub async fn feed<R>(
    mut decoder: LineDecoder<R>,
    input: PipelineWriter,
    mut stop: StopListener,
) -> Result<FeedReport>
where
    R: AsyncRead + Unpin,
{
    let mut lines = 0usize;

    if stop.is_requested() {
        input.complete();
        debug!("stop requested before feeding started");
        return Ok(FeedReport {
            lines,
            end: FeedEnd::Stopped,
        });
    }

    let outcome = loop {
        let next = tokio::select! {
            biased;
            _ = stop.requested() => break Ok(FeedEnd::Stopped),
            _ = input.closed() => break Ok(FeedEnd::ConsumerGone),
            next = decoder.next_line() => next,
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(FeedEnd::Exhausted),
            Err(e) => break Err(e),
        };

        tokio::select! {
            biased;
            _ = stop.requested() => break Ok(FeedEnd::Stopped),
            sent = input.send(PipelineItem::Text(line)) => {
                if sent.is_err() {
                    break Ok(FeedEnd::ConsumerGone);
                }
                lines += 1;
            }
        }
    };

    input.complete();

    let end = outcome?;
    info!(lines, ?end, "input feeding finished");
    Ok(FeedReport { lines, end })
}
