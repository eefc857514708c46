//! All error types for the nslocalized crate.
//!
//! These are returned from all fallible operations (decoding, parsing, lookups and writing).

use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("decode error: invalid {encoding} input near byte {offset}")]
    Decode {
        encoding: &'static str,
        offset: usize,
    },

    #[error("syntax error on line {line}: {kind} in `{text}`")]
    Syntax {
        kind: SyntaxErrorKind,
        line: usize,
        text: String,
    },

    #[error("invalid codepoint U+{0:04X}")]
    InvalidCodepoint(u32),

    #[error("malformed surrogate 0x{0:04X}")]
    MalformedSurrogate(u16),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("cannot write an entry with an empty source")]
    EmptySource,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a syntax error for the given physical line.
    pub fn syntax(kind: SyntaxErrorKind, line: usize, text: impl Into<String>) -> Self {
        Error::Syntax {
            kind,
            line,
            text: text.into(),
        }
    }

    /// Returns the kind of grammar violation, if this is a syntax error.
    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            Error::Syntax { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// The grammar rule a `.strings` source violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// Text that cannot start an item at the top level.
    UnexpectedInput,
    /// A key that is not followed by `=`.
    MissingEquals,
    /// A value that is not followed by `;`.
    MissingSemicolon,
    /// A `/*` comment still open at end of input.
    UnterminatedComment,
    /// A quoted key or value still open at end of input.
    UnterminatedString,
    /// An entry cut off between its tokens at end of input.
    TruncatedEntry,
    /// A quoted key with no characters.
    EmptyKey,
}

impl Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            SyntaxErrorKind::UnexpectedInput => "unexpected input",
            SyntaxErrorKind::MissingEquals => "missing '='",
            SyntaxErrorKind::MissingSemicolon => "missing ';'",
            SyntaxErrorKind::UnterminatedComment => "unterminated comment",
            SyntaxErrorKind::UnterminatedString => "unterminated string",
            SyntaxErrorKind::TruncatedEntry => "truncated entry",
            SyntaxErrorKind::EmptyKey => "empty key",
        };
        f.write_str(message)
    }
}
