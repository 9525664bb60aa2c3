//! Match counting between a candidate and a reference tuple set.
//!
//! Each reference proposition may satisfy at most one candidate proposition
//! and vice versa, so counting matches is a bipartite matching problem. The
//! counter visits candidates relations-first, then attributes, then objects,
//! and grows the matching with augmenting paths. The result is a maximum
//! matching, which makes the count symmetric in its two arguments.

use super::{Proposition, TupleSet};
use crate::graph::Concept;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Synonym/similarity oracle over concepts.
///
/// Implementations must be symmetric and reflexive.
pub trait SimilarityOracle: Send + Sync {
    fn similar(&self, a: &Concept, b: &Concept) -> bool;
}

/// Default oracle: concepts are similar when they share a word form or a
/// sense id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedSenses;

impl SimilarityOracle for SharedSenses {
    fn similar(&self, a: &Concept, b: &Concept) -> bool {
        a.matches(b) || a.shares_sense(b)
    }
}

/// Equivalence relation used when pairing propositions.
#[derive(Clone, Copy)]
pub enum Equivalence<'a> {
    /// Slots must share a word form.
    Exact,
    /// Slots must be similar under the oracle.
    Similar(&'a dyn SimilarityOracle),
}

impl Equivalence<'_> {
    pub fn holds(&self, a: &Proposition, b: &Proposition) -> bool {
        match self {
            Equivalence::Exact => a.matches(b),
            Equivalence::Similar(oracle) => a.similar_to(b, *oracle),
        }
    }
}

impl fmt::Debug for Equivalence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equivalence::Exact => f.write_str("Exact"),
            Equivalence::Similar(_) => f.write_str("Similar"),
        }
    }
}

/// Plain and weighted number of matched pairs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchCount {
    pub n: usize,
    pub weighted_n: f64,
}

/// The pairs chosen by the counter, plus their count.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub count: MatchCount,
    /// (candidate index, reference index), ordered by candidate index.
    pub pairs: Vec<(usize, usize)>,
    candidate_len: usize,
    reference_len: usize,
}

impl Alignment {
    /// Per-member flag for the candidate set.
    pub fn candidate_matched(&self) -> Vec<bool> {
        let mut flags = vec![false; self.candidate_len];
        for &(c, _) in &self.pairs {
            flags[c] = true;
        }
        flags
    }

    /// Per-member flag for the reference set.
    pub fn reference_matched(&self) -> Vec<bool> {
        let mut flags = vec![false; self.reference_len];
        for &(_, r) in &self.pairs {
            flags[r] = true;
        }
        flags
    }
}

/// Counts candidate propositions with a distinct matching reference.
///
/// A matched pair contributes `min(w_candidate, w_reference)` to the weighted
/// count, so no pair outweighs either of its sides.
pub fn count(
    candidate: &TupleSet,
    reference: &TupleSet,
    equivalence: Equivalence<'_>,
) -> MatchCount {
    align(candidate, reference, equivalence).count
}

/// Computes a maximum one-to-one matching between the two sets.
pub fn align(
    candidate: &TupleSet,
    reference: &TupleSet,
    equivalence: Equivalence<'_>,
) -> Alignment {
    let candidates: Vec<_> = candidate.iter().collect();
    let references: Vec<_> = reference.iter().collect();

    let edges: Vec<Vec<usize>> = candidates
        .iter()
        .map(|c| {
            (0..references.len())
                .filter(|&r| equivalence.holds(&c.proposition, &references[r].proposition))
                .collect()
        })
        .collect();

    // Stable sort keeps insertion order within each arity.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&c| Reverse(candidates[c].proposition.arity()));

    let mut owner: Vec<Option<usize>> = vec![None; references.len()];
    for c in order {
        let mut visited = vec![false; references.len()];
        augment(c, &edges, &mut owner, &mut visited);
    }

    let mut pairs: Vec<(usize, usize)> = owner
        .iter()
        .enumerate()
        .filter_map(|(r, c)| c.map(|c| (c, r)))
        .collect();
    pairs.sort_unstable();

    let weighted_n: f64 = pairs
        .iter()
        .map(|&(c, r)| candidates[c].weight.min(references[r].weight))
        .sum();

    Alignment {
        count: MatchCount {
            n: pairs.len(),
            weighted_n,
        },
        pairs,
        candidate_len: candidates.len(),
        reference_len: references.len(),
    }
}

/// Tries to give candidate `c` a partner, re-seating earlier candidates along
/// an alternating path when the direct partners are taken.
fn augment(
    c: usize,
    edges: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &r in &edges[c] {
        if visited[r] {
            continue;
        }
        visited[r] = true;
        let current = owner[r];
        if current.is_none_or(|other| augment(other, edges, owner, visited)) {
            owner[r] = Some(c);
            return true;
        }
    }
    false
}
