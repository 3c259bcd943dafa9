//! Key paths
//!
//! A non-empty list of object keys leading from the root to a node.

use std::fmt;

/// Location of a node in the document tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Build a path from its segments.
    ///
    /// Returns `None` for an empty list: the root itself is not addressable.
    pub fn new<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// All segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into the parent segments and the final key
    pub fn split_last(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            // Unreachable: paths are non-empty by construction
            None => (&self.segments[..0], ""),
        }
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Never true for a constructed path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
