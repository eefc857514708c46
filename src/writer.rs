//! Canonical `.strings` output.

use std::io::Write;

use crate::{
    encoding::TextEncoding, error::Error, escape::escape_for_output, options::WriteOptions,
    types::Catalog,
};

const NO_DESCRIPTION: &str = "No description";

/// Writes `catalog` to `writer` in canonical form.
///
/// Entries are written in ascending ordinal order of their source, separated
/// by a blank line. UTF-16 output starts with a byte-order mark; UTF-8 output
/// does not. The writer is flushed before returning.
///
/// A catalog holding an entry with an empty source is rejected with
/// [`Error::EmptySource`] before any byte is written, since `""` is not a
/// readable key.
pub fn write_catalog<W: Write>(
    catalog: &Catalog,
    mut writer: W,
    options: &WriteOptions,
) -> Result<(), Error> {
    if catalog.contains("") {
        return Err(Error::EmptySource);
    }

    let entries = catalog.sorted_entries();
    tracing::debug!(
        entries = entries.len(),
        encoding = %options.encoding,
        "writing strings catalog"
    );

    let mut bytes = Vec::new();
    if options.encoding != TextEncoding::Utf8 {
        options.encoding.encode("\u{feff}", &mut bytes);
    }

    let mut text = String::new();
    for (index, entry) in entries.into_iter().enumerate() {
        text.clear();
        if index > 0 {
            text.push('\n');
        }

        match entry.comment() {
            Some(comment) => push_comment(&mut text, comment),
            None if options.include_empty_comments => push_comment(&mut text, NO_DESCRIPTION),
            None => {}
        }

        text.push('"');
        text.push_str(&escape_for_output(&entry.source));
        text.push_str("\" = \"");
        text.push_str(&escape_for_output(&entry.target));
        text.push_str("\";\n");

        options.encoding.encode(&text, &mut bytes);
        writer.write_all(&bytes)?;
        bytes.clear();
    }

    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn push_comment(text: &mut String, comment: &str) {
    text.push_str("/* ");
    // An embedded terminator would end the comment early on re-read.
    text.push_str(&comment.replace("*/", "* /"));
    text.push_str(" */\n");
}
