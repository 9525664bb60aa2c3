//! Novelty filter: propositions never seen in a training corpus.
//!
//! The filter holds canonical keys for every elementary tuple extracted from
//! a large set of training captions. A proposition is novel only if none of
//! its elementary readings is a known key. Filters built from corpus shards
//! can be merged.
//!
//! Once scoring starts the filter is only read; share it behind an `Arc`.

use super::TupleFilter;
use crate::corpus::load_captions;
use crate::error::CorpusError;
use crate::tuples::{canonical_key, Proposition};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Caption parser collaborator: turns a caption into unmerged elementary
/// tuples, each laid out like [`Proposition::elementary_tuples`].
pub trait TupleExtractor {
    fn extract(&self, caption: &str) -> Vec<Vec<String>>;
}

impl<F> TupleExtractor for F
where
    F: Fn(&str) -> Vec<Vec<String>>,
{
    fn extract(&self, caption: &str) -> Vec<Vec<String>> {
        self(caption)
    }
}

/// Category filter selecting propositions absent from a training corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoveltyFilter {
    training: HashSet<String>,
}

impl NoveltyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from already-extracted elementary tuples.
    pub fn from_tuples<I, T, S>(source: &str, tuples: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        info!("Building novelty filter from {}", source);
        let mut filter = Self::new();
        for tuple in tuples {
            filter.insert(tuple.as_ref());
        }
        info!("Found {} tuples", filter.len());
        filter
    }

    /// Parses every caption with `extractor` and records its tuples.
    pub fn build(source: &str, captions: &[String], extractor: &dyn TupleExtractor) -> Self {
        Self::from_tuples(
            source,
            captions.iter().flat_map(|caption| extractor.extract(caption)),
        )
    }

    /// Loads a COCO-style caption file and builds a filter from it.
    pub fn from_corpus_file(
        path: &Path,
        extractor: &dyn TupleExtractor,
    ) -> Result<Self, CorpusError> {
        let captions = load_captions(path)?;
        Ok(Self::build(&path.display().to_string(), &captions, extractor))
    }

    /// Records one elementary tuple. Returns true if it was new.
    pub fn insert<S: AsRef<str>>(&mut self, words: &[S]) -> bool {
        self.training.insert(canonical_key(words))
    }

    pub fn contains<S: AsRef<str>>(&self, words: &[S]) -> bool {
        self.training.contains(&canonical_key(words))
    }

    /// Number of distinct training tuples.
    pub fn len(&self) -> usize {
        self.training.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training.is_empty()
    }

    /// Adds every training tuple of `other`.
    pub fn merge(&mut self, other: &NoveltyFilter) {
        self.training.extend(other.training.iter().cloned());
        info!("Merged novelty filter: {} tuples", self.training.len());
    }

    /// True if no elementary reading of `proposition` was seen in training.
    pub fn is_novel(&self, proposition: &Proposition) -> bool {
        proposition
            .elementary_keys()
            .iter()
            .all(|key| !self.training.contains(key))
    }
}

impl TupleFilter for NoveltyFilter {
    fn matches(&self, proposition: &Proposition) -> bool {
        self.is_novel(proposition)
    }
}
