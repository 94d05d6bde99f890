use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use scripthost::decode::TextEncoding;
use scripthost::modes::Console;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// In-memory `AsyncWrite` whose contents stay readable after the writer has
/// been boxed into a `Console`.
#[derive(Debug, Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl AsyncWrite for SharedBuf {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// `AsyncRead` over a byte vector that hands out at most `chunk` bytes per
/// read, to exercise buffer-boundary handling.
#[derive(Debug)]
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    reads: usize,
}

impl ChunkedReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk: chunk.max(1),
            reads: 0,
        }
    }

    /// Number of `poll_read` calls that completed.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.chunk).min(buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        self.reads += 1;
        Poll::Ready(Ok(()))
    }
}

/// `AsyncRead` that fails on the first read.
#[derive(Debug, Default)]
pub struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin went away")))
    }
}

/// Console over in-memory stdin, with handles to inspect what was written.
pub struct TestConsole {
    pub console: Console,
    pub stdout: SharedBuf,
    pub stderr: SharedBuf,
}

impl TestConsole {
    pub fn with_stdin(stdin: &'static [u8]) -> Self {
        Self::with_reader(Box::new(stdin))
    }

    pub fn with_reader(stdin: Box<dyn AsyncRead + Unpin + Send>) -> Self {
        let stdout = SharedBuf::new();
        let stderr = SharedBuf::new();
        let console = Console::new(
            stdin,
            Box::new(stdout.clone()),
            Box::new(stderr.clone()),
            TextEncoding::Utf8,
        );
        Self {
            console,
            stdout,
            stderr,
        }
    }
}
