//! Options for reading and writing `.strings` files.

use crate::encoding::TextEncoding;

/// Read behavior options for [`crate::parse_with`] and [`crate::Catalog::read_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Encoding to decode with instead of sniffing the byte-order mark.
    ///
    /// A byte-order mark of this same encoding is still skipped.
    pub encoding: Option<TextEncoding>,
}

impl ReadOptions {
    /// Creates default read options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces (or, with `None`, stops forcing) the input encoding.
    pub fn with_encoding(mut self, encoding: Option<TextEncoding>) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Write behavior options for [`crate::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Output encoding; UTF-16 big-endian unless set.
    pub encoding: TextEncoding,
    /// Writes `/* No description */` above entries without a comment.
    pub include_empty_comments: bool,
}

impl WriteOptions {
    /// Creates default write options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enables/disables placeholder comments for undocumented entries.
    pub fn with_empty_comments(mut self, include_empty_comments: bool) -> Self {
        self.include_empty_comments = include_empty_comments;
        self
    }
}
