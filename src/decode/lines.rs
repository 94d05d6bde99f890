// src/decode/lines.rs

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use super::buffer::{DecoderCarry, RawBufferState};
use super::encoding::TextEncoding;

/// Default read-buffer size.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Lazily decodes an `AsyncRead` byte source into lines.
///
/// Lines end at `\n`, `\r` or `\r\n`; the delimiter is never part of the
/// returned text. A `\r\n` pair split across two reads still counts as one
/// break. A final fragment without a delimiter is returned once at
/// end-of-source.
///
/// The sequence is not restartable: once `next_line` returns `Ok(None)` it
/// keeps doing so.
#[derive(Debug)]
pub struct LineDecoder<R> {
    reader: R,
    encoding: TextEncoding,
    raw: RawBufferState,
    carry: DecoderCarry,
}

impl<R> LineDecoder<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R, encoding: TextEncoding) -> Self {
        Self::with_capacity(reader, encoding, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(reader: R, encoding: TextEncoding, capacity: usize) -> Self {
        Self {
            reader,
            encoding,
            raw: RawBufferState::with_capacity(capacity),
            carry: DecoderCarry::default(),
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Produce the next decoded line, reading more input as needed.
    ///
    /// Read errors are returned as-is and leave the decoder unusable for
    /// further meaningful output.
    ///
    /// Cancel-safe: every `.await` happens while the state is consistent, so
    /// dropping the future mid-read loses no bytes already consumed.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if self.raw.is_exhausted() {
                if self.raw.at_eof() {
                    return Ok(self.carry.flush().map(|bytes| self.encoding.decode(&bytes)));
                }
                let n = self.raw.refill(&mut self.reader).await?;
                trace!(bytes = n, "decoder refilled buffer");
                continue;
            }

            if self.carry.pending_cr {
                self.carry.pending_cr = false;
                if self.raw.pending().first() == Some(&b'\n') {
                    self.raw.advance(1);
                    continue;
                }
            }

            let pending = self.raw.pending();
            match pending.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(idx) => {
                    let is_cr = pending[idx] == b'\r';
                    let bytes = self.carry.complete(&pending[..idx]);
                    self.raw.advance(idx + 1);
                    self.carry.pending_cr = is_cr;
                    return Ok(Some(self.encoding.decode(&bytes)));
                }
                None => {
                    let n = pending.len();
                    self.carry.stash(pending);
                    self.raw.advance(n);
                }
            }
        }
    }

    /// Drain the remaining lines into a `Vec`.
    pub async fn collect_lines(mut self) -> std::io::Result<Vec<String>> {
        let mut out = Vec::new();
        while let Some(line) = self.next_line().await? {
            out.push(line);
        }
        Ok(out)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Read a whole source as one block of text, without splitting lines.
pub async fn read_to_text<R>(reader: &mut R, encoding: TextEncoding) -> std::io::Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    Ok(encoding.decode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decode(input: &[u8], capacity: usize) -> Vec<String> {
        LineDecoder::with_capacity(input, TextEncoding::Utf8, capacity)
            .collect_lines()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn mixed_delimiters() {
        let lines = decode(b"a\r\nb\rc\n\nd", 64).await;
        assert_eq!(lines, vec!["a", "b", "c", "", "d"]);
    }

    #[tokio::test]
    async fn crlf_split_across_reads() {
        // capacity 2: "a\r" | "\nb"
        let lines = decode(b"a\r\nb", 2).await;
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn trailing_cr_at_eof() {
        assert_eq!(decode(b"x\r", 1).await, vec!["x"]);
    }

    #[tokio::test]
    async fn cr_cr_is_two_breaks() {
        assert_eq!(decode(b"a\r\rb", 3).await, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn empty_source_yields_nothing() {
        assert!(decode(b"", 8).await.is_empty());
    }

    #[tokio::test]
    async fn exhausted_decoder_stays_exhausted() {
        let mut dec = LineDecoder::new(&b"only"[..], TextEncoding::Utf8);
        assert_eq!(dec.next_line().await.unwrap().as_deref(), Some("only"));
        assert_eq!(dec.next_line().await.unwrap(), None);
        assert_eq!(dec.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn multibyte_char_split_across_reads() {
        let lines = decode("héllo\nwörld".as_bytes(), 1).await;
        assert_eq!(lines, vec!["héllo", "wörld"]);
    }

    #[tokio::test]
    async fn read_to_text_keeps_delimiters() {
        let mut src: &[u8] = b"one\r\ntwo\n";
        let text = read_to_text(&mut src, TextEncoding::Utf8).await.unwrap();
        assert_eq!(text, "one\r\ntwo\n");
    }
}
