//! Core types for nslocalized.
//! The parser stores into these; the writer serializes these.

use std::{
    collections::{HashMap, hash_map},
    fmt::Display,
    ops::Index,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single translation unit of a `.strings` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// The key: an original-language string or a bare identifier.
    ///
    /// Identifies the entry inside a [`Catalog`] and is never empty there.
    pub source: String,

    /// The translated (current) value.
    pub target: String,

    /// Optional note for translators.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub comment: Option<String>,
}

impl Entry {
    /// Creates an entry without a comment.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Entry {
            source: source.into(),
            target: target.into(),
            comment: None,
        }
    }

    /// Attaches a comment to the entry. An empty comment counts as none.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = if comment.is_empty() {
            None
        } else {
            Some(comment)
        };
        self
    }

    /// The comment, if present and non-empty.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|comment| !comment.is_empty())
    }

    // Folds a later occurrence of the same key into this entry.
    fn merge(&mut self, newer: Entry) {
        if let Some(comment) = newer.comment.filter(|comment| !comment.is_empty()) {
            match &mut self.comment {
                Some(existing) if !existing.is_empty() => {
                    existing.push('\n');
                    existing.push_str(&comment);
                }
                slot => *slot = Some(comment),
            }
        }
        self.target = newer.target;
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entry {{ source: {}, target: {}, comment: {:?} }}",
            self.source, self.target, self.comment
        )
    }
}

/// The full keyed collection of entries of one `.strings` file.
///
/// Keys are unique and always equal the `source` of the entry they map to.
/// Enumeration through [`Catalog::iter`] is unordered;
/// [`Catalog::sorted_entries`] gives the ordinal order used for output.
///
/// ```rust
/// use nslocalized::{Catalog, Entry};
///
/// let mut catalog = Catalog::new();
/// catalog.store(Entry::new("k", "v1").with_comment("c1"));
/// catalog.store(Entry::new("k", "v2").with_comment("c2"));
///
/// let entry = catalog.lookup("k").unwrap();
/// assert_eq!(entry.target, "v2");
/// assert_eq!(entry.comment(), Some("c1\nc2"));
/// assert_eq!(&catalog["k"], "v2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: HashMap<String, Entry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Returns the entry stored under `source`, if any.
    pub fn lookup(&self, source: &str) -> Option<&Entry> {
        self.entries.get(source)
    }

    /// Inserts `entry`, or merges it into the entry already stored under the
    /// same source.
    ///
    /// On merge the new target replaces the old one, and a non-empty new
    /// comment is appended to the existing comment on a new line.
    pub fn store(&mut self, entry: Entry) {
        match self.entries.entry(entry.source.clone()) {
            hash_map::Entry::Occupied(mut occupied) => occupied.get_mut().merge(entry),
            hash_map::Entry::Vacant(vacant) => {
                let mut entry = entry;
                if entry.comment.as_deref() == Some("") {
                    entry.comment = None;
                }
                vacant.insert(entry);
            }
        }
    }

    /// Returns the target stored under `source`.
    pub fn get_target(&self, source: &str) -> Result<&str, Error> {
        self.entries
            .get(source)
            .map(|entry| entry.target.as_str())
            .ok_or_else(|| Error::KeyNotFound(source.to_string()))
    }

    /// Sets the target of `source`, keeping any existing comment.
    pub fn set_target(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.store(Entry::new(source, target));
    }

    /// Stores every entry of `other` into this catalog, in `other`'s ordinal
    /// key order.
    pub fn merge(&mut self, other: Catalog) {
        let mut entries: Vec<Entry> = other.entries.into_values().collect();
        entries.sort_by(|a, b| a.source.cmp(&b.source));
        for entry in entries {
            self.store(entry);
        }
    }

    /// Iterates over the entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// All entries in ascending ordinal (Unicode scalar value) order of their
    /// source.
    pub fn sorted_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        // Byte order of UTF-8 is codepoint order.
        entries.sort_unstable_by(|a, b| a.source.cmp(&b.source));
        entries
    }
}

/// Indexes the target of an entry by its source.
///
/// # Panics
///
/// Panics if no entry is stored under `source`; use [`Catalog::get_target`]
/// for a fallible lookup.
impl Index<&str> for Catalog {
    type Output = str;

    fn index(&self, source: &str) -> &Self::Output {
        &self.entries[source].target
    }
}

impl Extend<Entry> for Catalog {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.store(entry);
        }
    }
}

impl FromIterator<Entry> for Catalog {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        catalog.extend(iter);
        catalog
    }
}

impl IntoIterator for Catalog {
    type Item = Entry;
    type IntoIter = hash_map::IntoValues<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = hash_map::Values<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
