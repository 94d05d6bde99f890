// src/decode/mod.rs

//! Incremental byte-to-line decoding.
//!
//! - [`buffer`] holds the explicit decoder state: the refillable read buffer
//!   and the carry that survives across refills.
//! - [`encoding`] turns completed byte lines into text.
//! - [`lines`] drives both over an `AsyncRead` source.

pub mod buffer;
pub mod encoding;
pub mod lines;

pub use buffer::{DecoderCarry, RawBufferState};
pub use encoding::TextEncoding;
pub use lines::{DEFAULT_CAPACITY, LineDecoder, read_to_text};
