// src/decode/buffer.rs

use tokio::io::{AsyncRead, AsyncReadExt};

/// Fixed-capacity read buffer with a scan offset and an end-of-source flag.
///
/// Bytes in `data[offset..len]` have been read but not yet scanned.
#[derive(Debug)]
pub struct RawBufferState {
    data: Box<[u8]>,
    offset: usize,
    len: usize,
    eof: bool,
}

impl RawBufferState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)].into_boxed_slice(),
            offset: 0,
            len: 0,
            eof: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.len
    }

    pub fn at_eof(&self) -> bool {
        self.eof
    }

    /// Unscanned bytes.
    pub fn pending(&self) -> &[u8] {
        &self.data[self.offset..self.len]
    }

    /// Mark `n` pending bytes as consumed.
    pub fn advance(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.len);
    }

    /// Perform exactly one read into the (exhausted) buffer.
    ///
    /// A zero-length read flips the end-of-source flag. Cancel-safe: if the
    /// future is dropped while the read is pending, nothing has changed.
    pub async fn refill<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        debug_assert!(self.is_exhausted());
        let n = reader.read(&mut self.data).await?;
        self.offset = 0;
        self.len = n;
        if n == 0 {
            self.eof = true;
        }
        Ok(n)
    }
}

/// State carried between reads: a partial line and the pending-CR flag.
#[derive(Debug, Default)]
pub struct DecoderCarry {
    /// The last delimiter emitted was `\r`; a `\n` arriving next belongs to
    /// it and must be swallowed.
    pub pending_cr: bool,
    partial: Vec<u8>,
}

impl DecoderCarry {
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    pub fn stash(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);
    }

    /// Join the carried fragment with `tail` and clear the carry.
    pub fn complete(&mut self, tail: &[u8]) -> Vec<u8> {
        if self.partial.is_empty() {
            return tail.to_vec();
        }
        let mut line = std::mem::take(&mut self.partial);
        line.extend_from_slice(tail);
        line
    }

    /// Take whatever is left at end-of-source.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        self.pending_cr = false;
        if self.partial.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.partial))
        }
    }
}
