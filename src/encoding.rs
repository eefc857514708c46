//! Byte-order-mark sniffing and incremental decoding into physical lines.

use std::{
    fmt::{Display, Formatter},
    io::Read,
};

use encoding_rs::{Decoder, DecoderResult, UTF_8, UTF_16BE, UTF_16LE};
use serde::{Deserialize, Serialize};

use crate::{error::Error, escape::encode_utf16_units};

const CHUNK_SIZE: usize = 8 * 1024;

/// The text encodings a `.strings` file can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    #[default]
    Utf16Be,
    Utf16Le,
}

impl TextEncoding {
    /// The conventional name of this encoding.
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf16Le => "UTF-16LE",
        }
    }

    /// The byte-order mark written in front of text in this encoding.
    pub fn bom(self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 => &[0xef, 0xbb, 0xbf],
            TextEncoding::Utf16Be => &[0xfe, 0xff],
            TextEncoding::Utf16Le => &[0xff, 0xfe],
        }
    }

    /// Appends the encoded bytes of `text` to `out`.
    pub fn encode(self, text: &str, out: &mut Vec<u8>) {
        match self {
            TextEncoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            TextEncoding::Utf16Be => {
                for unit in encode_utf16_units(text) {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            TextEncoding::Utf16Le => {
                for unit in encode_utf16_units(text) {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
        }
    }

    fn decoder(self) -> Decoder {
        let encoding = match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Utf16Be => UTF_16BE,
            TextEncoding::Utf16Le => UTF_16LE,
        };
        encoding.new_decoder_without_bom_handling()
    }
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the encoding announced by the leading bytes of a file.
///
/// Returns the encoding and the number of marker bytes to discard. Input
/// without a recognised byte-order mark is UTF-8 with nothing to discard.
///
/// ```rust
/// use nslocalized::encoding::{TextEncoding, sniff_bom};
///
/// assert_eq!(sniff_bom(&[0xfe, 0xff, 0x00]), (TextEncoding::Utf16Be, 2));
/// assert_eq!(sniff_bom(b"\"a\""), (TextEncoding::Utf8, 0));
/// ```
pub fn sniff_bom(head: &[u8]) -> (TextEncoding, usize) {
    match head {
        [0xfe, 0xff, ..] => (TextEncoding::Utf16Be, 2),
        [0xff, 0xfe, ..] => (TextEncoding::Utf16Le, 2),
        [0xef, 0xbb, 0xbf, ..] => (TextEncoding::Utf8, 3),
        _ => (TextEncoding::Utf8, 0),
    }
}

/// Pull-based iterator over the decoded physical lines of a byte source.
///
/// The encoding is chosen from the byte-order mark (or declared up front),
/// then bytes are decoded in fixed-size chunks as lines are requested. Lines
/// are yielded without their `\n` or `\r\n` terminator.
pub struct Lines<R> {
    reader: R,
    declared: Option<TextEncoding>,
    decoder: Option<(TextEncoding, Decoder)>,
    decoded: String,
    searched: usize,
    offset: usize,
    finished: bool,
    failed: bool,
}

impl<R: Read> Lines<R> {
    /// Decodes `reader` using the encoding its byte-order mark announces.
    pub fn new(reader: R) -> Self {
        Self::with_encoding(reader, None)
    }

    /// Decodes `reader`, optionally forcing an encoding instead of sniffing.
    ///
    /// A forced encoding still discards its own byte-order mark if present.
    pub fn with_encoding(reader: R, declared: Option<TextEncoding>) -> Self {
        Lines {
            reader,
            declared,
            decoder: None,
            decoded: String::new(),
            searched: 0,
            offset: 0,
            finished: false,
            failed: false,
        }
    }

    /// The encoding in use, once the first bytes have been read.
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.decoder.as_ref().map(|(encoding, _)| *encoding)
    }

    fn start(&mut self) -> Result<(), Error> {
        let mut head = [0u8; 3];
        let mut filled = 0;
        while filled < head.len() {
            match self.reader.read(&mut head[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        let head = &head[..filled];

        let (encoding, skip) = match self.declared {
            Some(encoding) if head.starts_with(encoding.bom()) => (encoding, encoding.bom().len()),
            Some(encoding) => (encoding, 0),
            None => sniff_bom(head),
        };
        tracing::debug!(%encoding, bom_len = skip, "detected text encoding");

        self.decoder = Some((encoding, encoding.decoder()));
        self.offset = skip;
        self.decode(&head[skip..], false)
    }

    fn fill(&mut self) -> Result<(), Error> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let read = self.reader.read(&mut chunk)?;
        if read == 0 {
            self.finished = true;
        }
        self.decode(&chunk[..read], read == 0)
    }

    fn decode(&mut self, mut bytes: &[u8], last: bool) -> Result<(), Error> {
        let Some((encoding, decoder)) = self.decoder.as_mut() else {
            return Ok(());
        };

        loop {
            let needed = decoder
                .max_utf8_buffer_length_without_replacement(bytes.len())
                .unwrap_or(bytes.len() * 3 + 4);
            self.decoded.reserve(needed);

            let (result, read) =
                decoder.decode_to_string_without_replacement(bytes, &mut self.decoded, last);
            self.offset += read;
            bytes = &bytes[read..];

            match result {
                DecoderResult::InputEmpty => return Ok(()),
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => {
                    return Err(Error::Decode {
                        encoding: encoding.name(),
                        offset: self.offset,
                    });
                }
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let newline = self.decoded[self.searched..].find('\n')? + self.searched;
        let mut line: String = self.decoded.drain(..=newline).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        self.searched = 0;
        Some(line)
    }

    fn next_line(&mut self) -> Result<Option<String>, Error> {
        if self.decoder.is_none() {
            self.start()?;
        }

        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }
            if self.finished {
                if self.decoded.is_empty() {
                    return Ok(None);
                }
                let mut line = std::mem::take(&mut self.decoded);
                if line.ends_with('\r') {
                    line.pop();
                }
                self.searched = 0;
                return Ok(Some(line));
            }
            self.searched = self.decoded.len();
            self.fill()?;
        }
    }
}

impl<R: Read> Iterator for Lines<R> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_line() {
            Ok(line) => line.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}
