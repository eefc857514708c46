//! Traits for reading and writing `.strings` files through any byte source.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    codec::parse_reader,
    error::Error,
    options::{ReadOptions, WriteOptions},
    parser::parse_lines,
    types::Catalog,
    writer::write_catalog,
};

/// A trait for parsing and writing a localization table from/to one file.
///
/// # Example
///
/// ```rust,no_run
/// use nslocalized::{Catalog, WriteOptions, traits::Parser};
///
/// let catalog = Catalog::read_from("en.lproj/Localizable.strings")?;
/// catalog.write_to("en_copy.strings", &WriteOptions::default())?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any byte reader, detecting the encoding from its byte-order mark.
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W, options: &WriteOptions) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P, options: &WriteOptions) -> Result<(), Error> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.to_writer(writer, options)
    }

    /// Parse from already-decoded text.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(bytes)
    }
}

impl Parser for Catalog {
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        parse_reader(reader, &ReadOptions::default())
    }

    fn to_writer<W: Write>(&self, writer: W, options: &WriteOptions) -> Result<(), Error> {
        write_catalog(self, writer, options)
    }

    /// Text may still start with a decoded byte-order mark, which is skipped.
    fn from_str(s: &str) -> Result<Self, Error> {
        let s = s.strip_prefix('\u{feff}').unwrap_or(s);
        parse_lines(s.lines())
    }
}
