//! Structural and vocabulary-based category filters.

use super::TupleFilter;
use crate::config::{COLOR_WORDS, COUNT_WORDS, SIZE_WORDS};
use crate::tuples::Proposition;

/// Selects propositions of one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityFilter {
    arity: usize,
}

impl ArityFilter {
    pub fn objects() -> Self {
        Self { arity: 1 }
    }

    pub fn attributes() -> Self {
        Self { arity: 2 }
    }

    pub fn relations() -> Self {
        Self { arity: 3 }
    }
}

impl TupleFilter for ArityFilter {
    fn matches(&self, proposition: &Proposition) -> bool {
        proposition.arity() == self.arity
    }
}

/// Selects attribute propositions whose attribute has a word in a fixed
/// vocabulary (colors, counts, sizes).
#[derive(Debug, Clone, Copy)]
pub struct VocabularyFilter {
    vocabulary: &'static [&'static str],
}

impl VocabularyFilter {
    pub fn new(vocabulary: &'static [&'static str]) -> Self {
        Self { vocabulary }
    }

    pub fn color() -> Self {
        Self::new(COLOR_WORDS)
    }

    pub fn count() -> Self {
        Self::new(COUNT_WORDS)
    }

    pub fn size() -> Self {
        Self::new(SIZE_WORDS)
    }
}

impl TupleFilter for VocabularyFilter {
    fn matches(&self, proposition: &Proposition) -> bool {
        match proposition {
            Proposition::Attribute(_, attribute) => attribute.has_word_in(self.vocabulary),
            _ => false,
        }
    }
}
