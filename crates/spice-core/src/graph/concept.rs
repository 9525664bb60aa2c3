//! Concepts: one slot of a proposition.
//!
//! A concept clusters the surface word forms that were merged into it
//! together with the dictionary sense ids attached to those words. Both sets
//! only grow, and only through [`Concept::merge_in_place`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Dictionary sense identifier (e.g. a WordNet synset offset).
pub type SenseId = u32;

/// Interchangeable word forms plus their sense ids.
///
/// A concept always has at least one word form. The sense set may be empty
/// when the parser found no dictionary entry for any of the words; such a
/// concept can still match exactly but never by shared sense.
///
/// Sets are ordered so that rendering and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ConceptRecord")]
pub struct Concept {
    words: BTreeSet<String>,
    senses: BTreeSet<SenseId>,
}

/// Unchecked wire form of a [`Concept`].
#[derive(Deserialize)]
struct ConceptRecord {
    words: BTreeSet<String>,
    #[serde(default)]
    senses: BTreeSet<SenseId>,
}

impl TryFrom<ConceptRecord> for Concept {
    type Error = &'static str;

    fn try_from(record: ConceptRecord) -> Result<Self, Self::Error> {
        if record.words.is_empty() {
            return Err("concept has no word forms");
        }
        Ok(Self {
            words: record.words,
            senses: record.senses,
        })
    }
}

impl Concept {
    /// Creates a concept for a single word form.
    pub fn new(word: impl Into<String>, senses: impl IntoIterator<Item = SenseId>) -> Self {
        Self {
            words: BTreeSet::from([word.into()]),
            senses: senses.into_iter().collect(),
        }
    }

    /// Creates a concept with no sense information.
    pub fn word(word: impl Into<String>) -> Self {
        Self::new(word, [])
    }

    pub fn words(&self) -> &BTreeSet<String> {
        &self.words
    }

    pub fn senses(&self) -> &BTreeSet<SenseId> {
        &self.senses
    }

    /// Folds `other` into `self`.
    ///
    /// Returns true if either set grew. Merging is idempotent, and merging
    /// A into B yields the same value as merging B into A.
    pub fn merge_in_place(&mut self, other: &Concept) -> bool {
        let before = (self.words.len(), self.senses.len());
        self.words.extend(other.words.iter().cloned());
        self.senses.extend(other.senses.iter().copied());
        before != (self.words.len(), self.senses.len())
    }

    /// Exact equivalence: the concepts share at least one word form.
    pub fn matches(&self, other: &Concept) -> bool {
        intersects(&self.words, &other.words)
    }

    /// True if the concepts share at least one sense id.
    pub fn shares_sense(&self, other: &Concept) -> bool {
        intersects(&self.senses, &other.senses)
    }

    /// True if any word form of this concept is in `vocabulary`.
    pub fn has_word_in(&self, vocabulary: &[&str]) -> bool {
        self.words.iter().any(|w| vocabulary.contains(&w.as_str()))
    }
}

/// Word forms joined by `/`, e.g. `dog/puppy`.
impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in &self.words {
            if !first {
                f.write_str("/")?;
            }
            f.write_str(word)?;
            first = false;
        }
        Ok(())
    }
}

/// Walks both ordered sets in lockstep.
fn intersects<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|item| large.contains(item))
}
