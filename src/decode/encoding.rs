// src/decode/encoding.rs

use std::fmt;

/// Text encodings the decoder can apply to a completed line.
///
/// All of them are ASCII-compatible, so `\r` and `\n` can be located on the
/// raw bytes before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Invalid sequences decode to U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit ASCII; bytes >= 0x80 decode to U+FFFD.
    Ascii,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }

    /// Encoding the platform declares for console input.
    ///
    /// On Unix this is the codeset of the active locale (`LC_ALL`, then
    /// `LC_CTYPE`, then `LANG`); anything unrecognised falls back to UTF-8.
    pub fn console_input() -> Self {
        if cfg!(windows) {
            return TextEncoding::Utf8;
        }
        ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .map(|locale| Self::from_locale(&locale))
            .unwrap_or_default()
    }

    /// Pick the encoding named by a locale string such as `en_US.UTF-8` or
    /// `de_DE.ISO-8859-1@euro`.
    pub fn from_locale(locale: &str) -> Self {
        let codeset = match locale.split_once('.') {
            Some((_, rest)) => rest.split('@').next().unwrap_or(rest),
            None if locale == "C" || locale == "POSIX" => return TextEncoding::Ascii,
            None => return TextEncoding::Utf8,
        };
        let normalized: String = codeset
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "iso88591" | "latin1" | "l1" => TextEncoding::Latin1,
            "ansix341968" | "usascii" | "ascii" => TextEncoding::Ascii,
            _ => TextEncoding::Utf8,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Ascii => "us-ascii",
        };
        f.write_str(s)
    }
}
