#![forbid(unsafe_code)]
//! Streaming reader and writer for Apple `.strings` localization files.
//!
//! A `.strings` file is a list of `"key" = "value";` pairs, each optionally
//! preceded by a `/* ... */` or `// ...` comment. Files may be UTF-8 or
//! UTF-16 (announced by a byte-order mark), and quoted strings use C-style
//! escapes. Everything is read into a [`Catalog`] of [`Entry`] values.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nslocalized::{TextEncoding, WriteOptions};
//!
//! let mut catalog = nslocalized::parse(std::path::Path::new("en.lproj/Localizable.strings"))?;
//! catalog.set_target("CFBundleDisplayName", "My Cool App");
//!
//! let options = WriteOptions::new().with_encoding(TextEncoding::Utf8);
//! nslocalized::write(&catalog, std::path::Path::new("out.strings"), &options)?;
//! # Ok::<(), nslocalized::Error>(())
//! ```
//!
//! # Pieces
//!
//! - [`encoding`]: byte-order-mark sniffing and incremental line decoding
//! - [`escape`]: escape sequences and surrogate pair conversion
//! - [`parser`]: the line-fed lexer state machine
//! - [`writer`]: canonical, sorted, escaped output

pub mod codec;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod options;
pub mod parser;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    codec::{Input, Output, parse, parse_with, write},
    encoding::TextEncoding,
    error::{Error, SyntaxErrorKind},
    options::{ReadOptions, WriteOptions},
    types::{Catalog, Entry},
};
