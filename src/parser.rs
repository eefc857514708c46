//! The `.strings` lexer: a state machine fed one physical line at a time.
//!
//! ```text
//! /* comment */            -> InBlockComment -> AfterComment
//! // comment               -> Scanning (comment pending)
//! "key" = "value";         -> InKey -> AfterKey -> AfterEquals -> InValue -> AfterValue
//! bareKey = "value";       -> AfterKey -> ...
//! ```
//!
//! Every committed entry is merged into the catalog under construction;
//! any grammar violation aborts the parse and drops that catalog.

use std::mem;

use crate::{
    error::{Error, SyntaxErrorKind},
    escape::{Escape, decode_escape},
    types::{Catalog, Entry},
};

/// Where the lexer is within the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Between items; the only state accepted at end of input.
    #[default]
    Scanning,
    /// Inside `/* ... */`.
    InBlockComment,
    /// A block comment closed; its text waits for the next key.
    AfterComment,
    /// Inside the quoted key.
    InKey,
    /// Key complete, expecting `=`.
    AfterKey,
    /// Expecting the opening quote of the value.
    AfterEquals,
    /// Inside the quoted value.
    InValue,
    /// Value complete, expecting `;`.
    AfterValue,
}

/// Incremental `.strings` lexer.
///
/// Feed it the decoded physical lines of a file, without their line
/// terminators, then call [`Lexer::finish`] to get the catalog.
///
/// Comments are held until the next entry commits, so a `//` comment after
/// the `;` of `"a" = "1"; // note` belongs to the entry that follows, not `a`.
///
/// ```rust
/// use nslocalized::parser::Lexer;
///
/// let mut lexer = Lexer::new();
/// lexer.feed_line("/* Greeting */").unwrap();
/// lexer.feed_line("\"hello\" = \"Bonjour\";").unwrap();
/// let catalog = lexer.finish().unwrap();
///
/// assert_eq!(&catalog["hello"], "Bonjour");
/// assert_eq!(catalog.lookup("hello").unwrap().comment(), Some("Greeting"));
/// ```
#[derive(Debug, Default)]
pub struct Lexer {
    state: State,
    buffer: String,
    key: Option<String>,
    value: Option<String>,
    comment: Vec<String>,
    continued: bool,
    line_number: usize,
    opened_line: usize,
    opened_text: String,
    catalog: Catalog,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of physical lines fed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Consumes one physical line.
    pub fn feed_line(&mut self, line: &str) -> Result<(), Error> {
        self.line_number += 1;

        let mut pos = 0;
        while pos < line.len() {
            pos += self.step(&line[pos..], line)?;
        }

        // A line break inside a quoted string is part of the string unless
        // escaped away by a trailing backslash.
        if matches!(self.state, State::InKey | State::InValue) && !self.continued {
            self.buffer.push('\n');
        }
        self.continued = false;

        // Only an item still open at the end of the line needs its text for
        // a later error, so the line is copied at most once.
        if self.state != State::Scanning && self.opened_line == self.line_number {
            self.opened_text.clear();
            self.opened_text.push_str(line);
        }

        Ok(())
    }

    /// Ends the input, returning the catalog if the lexer is between items.
    pub fn finish(self) -> Result<Catalog, Error> {
        let kind = match self.state {
            State::Scanning => {
                tracing::debug!(
                    entries = self.catalog.len(),
                    lines = self.line_number,
                    "parsed strings catalog"
                );
                return Ok(self.catalog);
            }
            State::InBlockComment => SyntaxErrorKind::UnterminatedComment,
            State::InKey | State::InValue => SyntaxErrorKind::UnterminatedString,
            State::AfterComment | State::AfterKey | State::AfterEquals | State::AfterValue => {
                SyntaxErrorKind::TruncatedEntry
            }
        };

        Err(Error::syntax(kind, self.opened_line, self.opened_text))
    }

    // Runs one transition on the unconsumed tail of `line`, returning the
    // number of bytes consumed. Always consumes at least one byte.
    fn step(&mut self, rest: &str, line: &str) -> Result<usize, Error> {
        match self.state {
            State::Scanning | State::AfterComment => self.scan_item(rest, line),
            State::InBlockComment => Ok(self.block_comment(rest)),
            State::InKey | State::InValue => self.quoted(rest, line),
            State::AfterKey => {
                let Some((skipped, ch)) = first_non_space(rest) else {
                    return Ok(rest.len());
                };
                if ch != '=' {
                    return Err(self.error(SyntaxErrorKind::MissingEquals, line));
                }
                self.state = State::AfterEquals;
                Ok(skipped + 1)
            }
            State::AfterEquals => {
                let Some((skipped, ch)) = first_non_space(rest) else {
                    return Ok(rest.len());
                };
                if ch != '"' {
                    return Err(self.error(SyntaxErrorKind::UnexpectedInput, line));
                }
                self.buffer.clear();
                self.state = State::InValue;
                Ok(skipped + 1)
            }
            State::AfterValue => {
                let Some((skipped, ch)) = first_non_space(rest) else {
                    return Ok(rest.len());
                };
                if ch != ';' {
                    return Err(self.error(SyntaxErrorKind::MissingSemicolon, line));
                }
                self.commit(line)?;
                Ok(skipped + 1)
            }
        }
    }

    fn scan_item(&mut self, rest: &str, line: &str) -> Result<usize, Error> {
        let Some((skipped, ch)) = first_non_space(rest) else {
            return Ok(rest.len());
        };
        let item = &rest[skipped..];

        if item.starts_with("/*") {
            self.open();
            self.state = State::InBlockComment;
            return Ok(skipped + 2);
        }

        if let Some(text) = item.strip_prefix("//") {
            self.push_comment(text);
            return Ok(rest.len());
        }

        if ch == '"' {
            self.open();
            self.buffer.clear();
            self.state = State::InKey;
            return Ok(skipped + 1);
        }

        if is_identifier_char(ch) {
            let len = item
                .find(|c: char| !is_identifier_char(c))
                .unwrap_or(item.len());
            self.open();
            self.key = Some(item[..len].to_string());
            self.state = State::AfterKey;
            return Ok(skipped + len);
        }

        Err(self.error(SyntaxErrorKind::UnexpectedInput, line))
    }

    fn block_comment(&mut self, rest: &str) -> usize {
        match rest.find("*/") {
            Some(end) => {
                self.push_comment(&rest[..end]);
                self.state = State::AfterComment;
                end + 2
            }
            None => {
                self.push_comment(rest);
                rest.len()
            }
        }
    }

    fn quoted(&mut self, rest: &str, line: &str) -> Result<usize, Error> {
        let Some(index) = rest.find(&['"', '\\'][..]) else {
            self.buffer.push_str(rest);
            return Ok(rest.len());
        };
        self.buffer.push_str(&rest[..index]);

        if rest.as_bytes()[index] == b'"' {
            self.close_quoted(line)?;
            return Ok(index + 1);
        }

        match decode_escape(&rest[index + 1..])? {
            (Escape::Char(ch), consumed) => {
                self.buffer.push(ch);
                Ok(index + 1 + consumed)
            }
            (Escape::LineContinuation, _) => {
                self.continued = true;
                Ok(index + 1)
            }
        }
    }

    fn close_quoted(&mut self, line: &str) -> Result<(), Error> {
        let text = mem::take(&mut self.buffer);
        if self.state == State::InKey {
            if text.is_empty() {
                return Err(self.error(SyntaxErrorKind::EmptyKey, line));
            }
            self.key = Some(text);
            self.state = State::AfterKey;
        } else {
            self.value = Some(text);
            self.state = State::AfterValue;
        }
        Ok(())
    }

    fn commit(&mut self, line: &str) -> Result<(), Error> {
        let (Some(source), Some(target)) = (self.key.take(), self.value.take()) else {
            return Err(self.error(SyntaxErrorKind::TruncatedEntry, line));
        };

        let comment = self.comment.join(" ");
        self.comment.clear();

        tracing::trace!(%source, line = self.line_number, "committed entry");
        self.catalog.store(Entry {
            source,
            target,
            comment: (!comment.is_empty()).then_some(comment),
        });
        self.state = State::Scanning;
        Ok(())
    }

    fn push_comment(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.comment.push(text.to_string());
        }
    }

    fn open(&mut self) {
        self.opened_line = self.line_number;
    }

    fn error(&self, kind: SyntaxErrorKind, line: &str) -> Error {
        Error::syntax(kind, self.line_number, line)
    }
}

/// Parses already-decoded physical lines into a catalog.
///
/// ```rust
/// use nslocalized::parser::parse_lines;
///
/// let catalog = parse_lines(["// App name", "CFBundleDisplayName = \"My Cool App\";"]).unwrap();
/// assert_eq!(&catalog["CFBundleDisplayName"], "My Cool App");
/// ```
pub fn parse_lines<I, S>(lines: I) -> Result<Catalog, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lexer = Lexer::new();
    for line in lines {
        lexer.feed_line(line.as_ref())?;
    }
    lexer.finish()
}

/// Characters allowed in an unquoted key.
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '$' | '+' | ':' | '.' | '-')
}

fn first_non_space(text: &str) -> Option<(usize, char)> {
    text.char_indices().find(|(_, ch)| !ch.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Catalog, Error> {
        parse_lines(text.lines())
    }

    fn syntax_kind(text: &str) -> SyntaxErrorKind {
        parse(text)
            .unwrap_err()
            .syntax_kind()
            .expect("expected a syntax error")
    }

    #[test]
    fn test_parse_basic_strings_with_comment() {
        let catalog = parse("/* Test string */\n\"åéîøü\" = \"ÅÉÎØÜ\";\n").unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(&catalog["åéîøü"], "ÅÉÎØÜ");
        assert_eq!(catalog.lookup("åéîøü").unwrap().comment(), Some("Test string"));
    }

    #[test]
    fn test_escapes() {
        let text = r#"
/* C escapes */
"\a\b\f\n\r\t\v" = "abfnrtv";

/* Octal escapes */
"\101" = "A";

/* Hex escapes */
"\x42" = "B";

/* BMP escapes */
"\u2030" = "PER MILLE";

/* Full Unicode escapes */
"\U0001F600" = "GRINNING FACE";

/* Quotes */
"This is \"quoted\" text." = "This is “quoted” text.";

/* Backslashes and others */
"This \\ is a backslash.  This \* is an asterisk." = "Backslash test";
"#;
        let catalog = parse(text).unwrap();
        assert_eq!(&catalog["\u{07}\u{08}\u{0c}\n\r\t\u{0b}"], "abfnrtv");
        assert_eq!(&catalog["A"], "A");
        assert_eq!(&catalog["B"], "B");
        assert_eq!(&catalog["‰"], "PER MILLE");
        assert_eq!(&catalog["😀"], "GRINNING FACE");
        assert_eq!(&catalog["This is \"quoted\" text."], "This is “quoted” text.");
        assert_eq!(
            &catalog["This \\ is a backslash.  This * is an asterisk."],
            "Backslash test"
        );
    }

    #[test]
    fn test_bad_codepoint_escapes_fail() {
        for text in [
            r#""\ud800" = "x";"#,
            r#""\U0000DC00" = "x";"#,
            r#""\U00110000" = "x";"#,
            r#""\xDFFF" = "x";"#,
            r#""k" = "\x110000";"#,
        ] {
            assert!(
                matches!(parse(text), Err(Error::InvalidCodepoint(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn test_comments() {
        let text = r#"
/* This is a C-style comment which goes over
   multiple lines */
"A" = "A";

/* This is a C-style comment with a
/* nested start
   comment */
"B" = "B";

/* This is a C-style comment with what looks like a key inside
"NotAKey" = "NotAValue";
*/
"C" = "C";

// This is a C++-style comment
"D" = "D";

// This C++-style comment goes over
// multiple lines
"E" = "E";

"ThisHasNoComment" = "NoComment";
"#;
        let catalog = parse(text).unwrap();
        let comment = |key: &str| catalog.lookup(key).unwrap().comment();

        assert_eq!(catalog.len(), 6);
        assert_eq!(
            comment("A"),
            Some("This is a C-style comment which goes over multiple lines")
        );
        assert_eq!(
            comment("B"),
            Some("This is a C-style comment with a /* nested start comment")
        );
        assert_eq!(
            comment("C"),
            Some(
                "This is a C-style comment with what looks like a key inside \"NotAKey\" = \"NotAValue\";"
            )
        );
        assert!(catalog.lookup("NotAKey").is_none());
        assert_eq!(comment("D"), Some("This is a C++-style comment"));
        assert_eq!(
            comment("E"),
            Some("This C++-style comment goes over multiple lines")
        );
        assert_eq!(comment("ThisHasNoComment"), None);
    }

    #[test]
    fn test_bare_keys() {
        let text = "/* Name of the app. */\nCFBundleDisplayName = \"My Cool App\";\nNSPhotoLibraryUsageDescription = \"Sharing photos is fun!\";\n";
        let catalog = parse(text).unwrap();
        assert_eq!(&catalog["CFBundleDisplayName"], "My Cool App");
        assert_eq!(
            catalog.lookup("CFBundleDisplayName").unwrap().comment(),
            Some("Name of the app.")
        );
        assert_eq!(
            &catalog["NSPhotoLibraryUsageDescription"],
            "Sharing photos is fun!"
        );
        assert_eq!(
            catalog
                .lookup("NSPhotoLibraryUsageDescription")
                .unwrap()
                .comment,
            None
        );
    }

    #[test]
    fn test_bare_key_without_spaces() {
        let catalog = parse("key.with-dots_1=\"v\";").unwrap();
        assert_eq!(&catalog["key.with-dots_1"], "v");
    }

    #[test]
    fn test_multiline_value_keeps_line_breaks() {
        let catalog = parse("\"multiline\" = \"line 1\n  line 2\n\nline 4\";").unwrap();
        assert_eq!(&catalog["multiline"], "line 1\n  line 2\n\nline 4");
    }

    #[test]
    fn test_line_continuation() {
        let catalog = parse("\"k\" = \"joined \\\ntogether\";").unwrap();
        assert_eq!(&catalog["k"], "joined together");

        let catalog = parse("\"k\\\ney\" = \"v\";").unwrap();
        assert_eq!(&catalog["key"], "v");
    }

    #[test]
    fn test_tokens_across_lines_and_shared_lines() {
        let catalog = parse("\"a\"\n  =\n  \"1\"\n  ;\n\"b\" = \"2\"; \"c\" = \"3\";").unwrap();
        assert_eq!(&catalog["a"], "1");
        assert_eq!(&catalog["b"], "2");
        assert_eq!(&catalog["c"], "3");
    }

    #[test]
    fn test_block_comment_on_entry_line() {
        let catalog = parse("/* inline */ \"k\" = \"v\";").unwrap();
        assert_eq!(catalog.lookup("k").unwrap().comment(), Some("inline"));
    }

    #[test]
    fn test_mixed_comment_styles_join() {
        let catalog = parse("/* block */\n// line\n\"k\" = \"v\";").unwrap();
        assert_eq!(catalog.lookup("k").unwrap().comment(), Some("block line"));
    }

    #[test]
    fn test_empty_block_comment_is_absent() {
        let catalog = parse("/* */\n\"k\" = \"v\";").unwrap();
        assert_eq!(catalog.lookup("k").unwrap().comment, None);
    }

    #[test]
    fn test_duplicate_keys_merge() {
        let catalog = parse("/* c1 */\n\"k\" = \"v1\";\n/* c2 */\n\"k\" = \"v2\";\n\"k\" = \"v3\";").unwrap();
        let entry = catalog.lookup("k").unwrap();
        assert_eq!(entry.target, "v3");
        assert_eq!(entry.comment(), Some("c1\nc2"));
    }

    #[test]
    fn test_empty_input_and_blank_lines() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n   \n\t\n").unwrap().is_empty());
        assert!(parse("// only a line comment").unwrap().is_empty());
    }

    #[test]
    fn test_empty_value() {
        let catalog = parse("\"empty\" = \"\";").unwrap();
        assert_eq!(&catalog["empty"], "");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(syntax_kind("@ garbage"), SyntaxErrorKind::UnexpectedInput);
        assert_eq!(syntax_kind("garbage!"), SyntaxErrorKind::MissingEquals);
        assert_eq!(syntax_kind("\"k\" \"v\";"), SyntaxErrorKind::MissingEquals);
        assert_eq!(syntax_kind("\"k\" = \"v\""), SyntaxErrorKind::TruncatedEntry);
        assert_eq!(syntax_kind("\"k\" = \"v\" x"), SyntaxErrorKind::MissingSemicolon);
        assert_eq!(syntax_kind("\"k\" = v;"), SyntaxErrorKind::UnexpectedInput);
        assert_eq!(syntax_kind("/* open"), SyntaxErrorKind::UnterminatedComment);
        assert_eq!(syntax_kind("\"k\" = \"open"), SyntaxErrorKind::UnterminatedString);
        assert_eq!(syntax_kind("\"k\" ="), SyntaxErrorKind::TruncatedEntry);
        assert_eq!(syntax_kind("/* dangling */"), SyntaxErrorKind::TruncatedEntry);
        assert_eq!(syntax_kind("\"\" = \"x\";"), SyntaxErrorKind::EmptyKey);
    }

    #[test]
    fn test_syntax_error_carries_line_context() {
        let error = parse("\"a\" = \"1\";\n\n\"b\" = \"2\" oops\n").unwrap_err();
        match error {
            Error::Syntax { kind, line, text } => {
                assert_eq!(kind, SyntaxErrorKind::MissingSemicolon);
                assert_eq!(line, 3);
                assert_eq!(text, "\"b\" = \"2\" oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_entry_points_at_its_start() {
        let error = parse("\"a\" = \"1\";\n\"b\" = \"unterminated\nstill going").unwrap_err();
        match error {
            Error::Syntax { kind, line, text } => {
                assert_eq!(kind, SyntaxErrorKind::UnterminatedString);
                assert_eq!(line, 2);
                assert_eq!(text, "\"b\" = \"unterminated");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_line_comment_after_semicolon_belongs_to_next_entry() {
        let catalog = parse("\"a\" = \"1\"; // note\n\"b\" = \"2\";").unwrap();
        assert!(catalog.lookup("a").unwrap().comment.is_none());
        assert_eq!(catalog.lookup("b").unwrap().comment(), Some("note"));
    }

    #[test]
    fn test_many_entries_on_one_line() {
        let count = 20_000;
        let mut line: String = (0..count)
            .map(|i| format!("\"key{i}\" = \"value number {i}\"; "))
            .collect();
        let catalog = parse(&line).unwrap();
        assert_eq!(catalog.len(), count);
        assert_eq!(&catalog["key19999"], "value number 19999");

        // An item left open on that line still reports the whole line.
        line.push_str("\"tail\" =");
        match parse(&line).unwrap_err() {
            Error::Syntax { kind, line: number, text } => {
                assert_eq!(kind, SyntaxErrorKind::TruncatedEntry);
                assert_eq!(number, 1);
                assert_eq!(text, line);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lexer_states() {
        let mut lexer = Lexer::new();
        assert_eq!(lexer.state(), State::Scanning);

        lexer.feed_line("/* open").unwrap();
        assert_eq!(lexer.state(), State::InBlockComment);
        lexer.feed_line("close */").unwrap();
        assert_eq!(lexer.state(), State::AfterComment);
        lexer.feed_line("\"key").unwrap();
        assert_eq!(lexer.state(), State::InKey);
        lexer.feed_line("\" = ").unwrap();
        assert_eq!(lexer.state(), State::AfterEquals);
        lexer.feed_line("\"value\"").unwrap();
        assert_eq!(lexer.state(), State::AfterValue);
        lexer.feed_line(";").unwrap();
        assert_eq!(lexer.state(), State::Scanning);
        assert_eq!(lexer.line_number(), 5);

        let catalog = lexer.finish().unwrap();
        assert_eq!(&catalog["key\n"], "value");
        assert_eq!(catalog.lookup("key\n").unwrap().comment(), Some("open close"));
    }
}
