//! Reading and writing catalogs from named files or already-open streams.
//!
//! A named resource is opened, used and closed by the call itself, on every
//! exit path. An open stream is only borrowed: the caller keeps ownership
//! and is responsible for closing it.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use crate::{
    encoding::Lines,
    error::Error,
    options::{ReadOptions, WriteOptions},
    parser::Lexer,
    types::Catalog,
    writer::write_catalog,
};

/// Where a catalog is read from.
pub enum Input<'a> {
    /// A file to open for the duration of the read.
    Path(&'a Path),
    /// A stream the caller already opened.
    Reader(&'a mut dyn Read),
}

impl<'a> From<&'a Path> for Input<'a> {
    fn from(path: &'a Path) -> Self {
        Input::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Input<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Input::Path(path.as_path())
    }
}

impl<'a, R: Read> From<&'a mut R> for Input<'a> {
    fn from(reader: &'a mut R) -> Self {
        Input::Reader(reader)
    }
}

/// Where a catalog is written to.
pub enum Output<'a> {
    /// A file to create (or truncate) for the duration of the write.
    Path(&'a Path),
    /// A sink the caller already opened.
    Writer(&'a mut dyn Write),
}

impl<'a> From<&'a Path> for Output<'a> {
    fn from(path: &'a Path) -> Self {
        Output::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Output<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Output::Path(path.as_path())
    }
}

impl<'a, W: Write> From<&'a mut W> for Output<'a> {
    fn from(writer: &'a mut W) -> Self {
        Output::Writer(writer)
    }
}

/// Parses a `.strings` file, detecting its encoding from the byte-order mark.
///
/// ```rust
/// let mut bytes: &[u8] = b"\xef\xbb\xbf/* Test string */\n\"hello\" = \"Hello\";\n";
/// let catalog = nslocalized::parse(&mut bytes)?;
/// assert_eq!(&catalog["hello"], "Hello");
/// # Ok::<(), nslocalized::Error>(())
/// ```
pub fn parse<'a>(input: impl Into<Input<'a>>) -> Result<Catalog, Error> {
    parse_with(input, &ReadOptions::default())
}

/// Parses a `.strings` file with explicit read options.
pub fn parse_with<'a>(
    input: impl Into<Input<'a>>,
    options: &ReadOptions,
) -> Result<Catalog, Error> {
    match input.into() {
        Input::Path(path) => {
            tracing::debug!(path = %path.display(), "reading strings file");
            let file = File::open(path)?;
            parse_reader(BufReader::new(file), options)
        }
        Input::Reader(reader) => parse_reader(reader, options),
    }
}

/// Writes a catalog in canonical `.strings` form.
pub fn write<'a>(
    catalog: &Catalog,
    output: impl Into<Output<'a>>,
    options: &WriteOptions,
) -> Result<(), Error> {
    match output.into() {
        Output::Path(path) => {
            tracing::debug!(path = %path.display(), "writing strings file");
            let file = File::create(path)?;
            write_catalog(catalog, BufWriter::new(file), options)
        }
        Output::Writer(writer) => write_catalog(catalog, writer, options),
    }
}

pub(crate) fn parse_reader<R: Read>(reader: R, options: &ReadOptions) -> Result<Catalog, Error> {
    let mut lexer = Lexer::new();
    for line in Lines::with_encoding(reader, options.encoding) {
        lexer.feed_line(&line?)?;
    }
    lexer.finish()
}

impl Catalog {
    /// Parses `input` and merges its entries into this catalog.
    ///
    /// The catalog is left untouched if reading or parsing fails.
    pub fn read_into<'a>(
        &mut self,
        input: impl Into<Input<'a>>,
        options: &ReadOptions,
    ) -> Result<(), Error> {
        let parsed = parse_with(input, options)?;
        self.merge(parsed);
        Ok(())
    }
}
