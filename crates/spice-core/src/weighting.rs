//! Document-frequency weighting of propositions.
//!
//! Weighted scores favour rare propositions: "man" appears in a large share
//! of reference descriptions, "double-decker" in very few. A
//! [`DocumentFrequencyTable`] counts, for every elementary tuple key, how many
//! documents (reference tuple sets) contain it and turns that into a smoothed
//! inverse document frequency.

use crate::tuples::{Proposition, TupleSet};
use std::collections::{HashMap, HashSet};

/// Source of per-proposition weights.
pub trait DocumentFrequency: Send + Sync {
    /// Weight for `proposition`, never negative.
    fn weight_for(&self, proposition: &Proposition) -> f64;
}

impl<F> DocumentFrequency for F
where
    F: Fn(&Proposition) -> f64 + Send + Sync,
{
    fn weight_for(&self, proposition: &Proposition) -> f64 {
        self(proposition)
    }
}

/// Every proposition weighs 1.0. Used when no table is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeights;

impl DocumentFrequency for UniformWeights {
    fn weight_for(&self, _proposition: &Proposition) -> f64 {
        1.0
    }
}

/// Document frequencies of elementary tuple keys.
#[derive(Debug, Clone, Default)]
pub struct DocumentFrequencyTable {
    frequencies: HashMap<String, usize>,
    num_documents: usize,
}

impl DocumentFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table with one document per tuple set.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a TupleSet>) -> Self {
        let mut table = Self::new();
        for document in documents {
            table.add_document(document);
        }
        table
    }

    /// Counts each elementary key of `document` once.
    pub fn add_document(&mut self, document: &TupleSet) {
        let keys: HashSet<String> = document
            .iter()
            .flat_map(|t| t.proposition.elementary_keys())
            .collect();
        for key in keys {
            *self.frequencies.entry(key).or_insert(0) += 1;
        }
        self.num_documents += 1;
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    /// Number of documents containing `key`.
    pub fn frequency(&self, key: &str) -> usize {
        self.frequencies.get(key).copied().unwrap_or(0)
    }

    fn idf(&self, frequency: usize) -> f64 {
        let n = self.num_documents as f64;
        ((n + 1.0) / (frequency as f64 + 1.0)).ln() + 1.0
    }
}

impl DocumentFrequency for DocumentFrequencyTable {
    /// Inverse document frequency of the rarest elementary reading.
    fn weight_for(&self, proposition: &Proposition) -> f64 {
        let rarest = proposition
            .elementary_keys()
            .iter()
            .map(|key| self.frequency(key))
            .min()
            .unwrap_or(0);
        self.idf(rarest)
    }
}
