// src/pipeline.rs

//! Pipeline items and the channels that carry them into and out of an
//! invocation.
//!
//! A channel is a bounded `mpsc` queue. The writer side is consumed by
//! [`PipelineWriter::complete`] (or simply dropped), so "marking the channel
//! complete" can happen at most once.

use std::fmt;

use tokio::sync::mpsc;

/// Default queue depth for input and output channels.
pub const CHANNEL_CAPACITY: usize = 64;

/// A structured error surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Short machine-friendly category, e.g. `CommandNotFound`.
    pub category: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.category, self.message)
        }
    }
}

/// One unit of data flowing through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineItem {
    Text(String),
    ErrorRecord(ErrorRecord),
    /// Passthrough value: exit status of the process behind an invocation.
    ExitCode(i32),
}

impl PipelineItem {
    pub fn text(s: impl Into<String>) -> Self {
        PipelineItem::Text(s.into())
    }
}

impl fmt::Display for PipelineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineItem::Text(s) => f.write_str(s),
            PipelineItem::ErrorRecord(rec) => fmt::Display::fmt(rec, f),
            PipelineItem::ExitCode(code) => write!(f, "{code}"),
        }
    }
}

/// Returned by [`PipelineWriter::send`] once the reading side is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed(pub PipelineItem);

/// Producer half of a pipeline channel.
#[derive(Debug)]
pub struct PipelineWriter {
    tx: mpsc::Sender<PipelineItem>,
}

impl PipelineWriter {
    /// Append an item, waiting for queue space if needed.
    pub async fn send(&self, item: PipelineItem) -> Result<(), Closed> {
        self.tx.send(item).await.map_err(|e| Closed(e.0))
    }

    /// Resolves once the reader has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Extra producer for the same channel. The channel completes once every
    /// producer is gone.
    pub(crate) fn clone_sender(&self) -> PipelineWriter {
        PipelineWriter {
            tx: self.tx.clone(),
        }
    }

    /// Signal that no more items will follow.
    pub fn complete(self) {
        drop(self);
    }
}

/// Consumer half of a pipeline channel. Yields items in insertion order.
#[derive(Debug)]
pub struct PipelineReader {
    rx: mpsc::Receiver<PipelineItem>,
}

impl PipelineReader {
    /// Next item, or `None` once the writer has completed and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<PipelineItem> {
        self.rx.recv().await
    }

    /// Drain everything until completion.
    pub async fn collect(mut self) -> Vec<PipelineItem> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }
}

pub fn channel(capacity: usize) -> (PipelineWriter, PipelineReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PipelineWriter { tx }, PipelineReader { rx })
}

/// An input channel that is already complete and carries no items.
pub fn completed() -> PipelineReader {
    let (writer, reader) = channel(1);
    writer.complete();
    reader
}
