//! Propositions and deduplicated, weighted tuple sets.
//!
//! A [`Proposition`] is one of three fixed-arity shapes: an object, an
//! object with an attribute, or a subject-relation-object triple. A
//! [`TupleSet`] holds the propositions of one description with exact
//! duplicates merged at insertion time, each carrying a weight used for the
//! weighted scores.

pub mod matching;

use crate::filter::TupleFilter;
use crate::graph::{Concept, SceneGraph};
use crate::weighting::DocumentFrequency;
use serde::{Deserialize, Serialize};

pub use matching::{
    align, count, Alignment, Equivalence, MatchCount, SharedSenses, SimilarityOracle,
};

// ============================================================================
// Proposition
// ============================================================================

/// Atomic semantic statement about a scene.
///
/// Relations store their slots as (subject, relation, object).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proposition {
    Object(Concept),
    Attribute(Concept, Concept),
    Relation(Concept, Concept, Concept),
}

impl Proposition {
    /// Number of concept slots (1, 2 or 3).
    pub fn arity(&self) -> usize {
        match self {
            Proposition::Object(_) => 1,
            Proposition::Attribute(..) => 2,
            Proposition::Relation(..) => 3,
        }
    }

    /// Concept slots in positional order.
    pub fn concepts(&self) -> Vec<&Concept> {
        match self {
            Proposition::Object(o) => vec![o],
            Proposition::Attribute(o, a) => vec![o, a],
            Proposition::Relation(s, r, o) => vec![s, r, o],
        }
    }

    /// Exact equivalence: same shape and every slot shares a word form.
    pub fn matches(&self, other: &Proposition) -> bool {
        self.slots_agree(other, Concept::matches)
    }

    /// Synonym-aware equivalence under `oracle`.
    pub fn similar_to(&self, other: &Proposition, oracle: &dyn SimilarityOracle) -> bool {
        self.slots_agree(other, |a, b| oracle.similar(a, b))
    }

    /// Merges `other` slot by slot. Propositions of different shapes are left
    /// untouched. Returns true if any slot grew.
    pub fn merge_in_place(&mut self, other: &Proposition) -> bool {
        match (self, other) {
            (Proposition::Object(a), Proposition::Object(b)) => a.merge_in_place(b),
            (Proposition::Attribute(a1, a2), Proposition::Attribute(b1, b2)) => {
                let first = a1.merge_in_place(b1);
                a2.merge_in_place(b2) | first
            }
            (Proposition::Relation(a1, a2, a3), Proposition::Relation(b1, b2, b3)) => {
                let first = a1.merge_in_place(b1);
                let second = a2.merge_in_place(b2);
                a3.merge_in_place(b3) | first | second
            }
            _ => false,
        }
    }

    /// Every single-word-per-slot reading of this proposition.
    ///
    /// A merged concept stands for several original word forms, so a
    /// proposition over merged concepts decomposes into the cartesian
    /// product of its slots' words.
    pub fn elementary_tuples(&self) -> Vec<Vec<&str>> {
        let mut readings: Vec<Vec<&str>> = vec![Vec::with_capacity(self.arity())];
        for concept in self.concepts() {
            let words = concept.words();
            readings = readings
                .into_iter()
                .flat_map(move |prefix| {
                    words.iter().map(move |word| {
                        let mut reading = prefix.clone();
                        reading.push(word.as_str());
                        reading
                    })
                })
                .collect();
        }
        readings
    }

    /// Canonical keys of [`Self::elementary_tuples`].
    pub fn elementary_keys(&self) -> Vec<String> {
        self.elementary_tuples()
            .iter()
            .map(|words| canonical_key(words))
            .collect()
    }

    /// One display string per slot, e.g. `["dog/puppy", "brown"]`.
    pub fn labels(&self) -> Vec<String> {
        self.concepts().iter().map(|c| c.to_string()).collect()
    }

    fn slots_agree(
        &self,
        other: &Proposition,
        eq: impl Fn(&Concept, &Concept) -> bool,
    ) -> bool {
        match (self, other) {
            (Proposition::Object(a), Proposition::Object(b)) => eq(a, b),
            (Proposition::Attribute(a1, a2), Proposition::Attribute(b1, b2)) => {
                eq(a1, b1) && eq(a2, b2)
            }
            (Proposition::Relation(a1, a2, a3), Proposition::Relation(b1, b2, b3)) => {
                eq(a1, b1) && eq(a2, b2) && eq(a3, b3)
            }
            _ => false,
        }
    }
}

/// Canonical string key for an elementary tuple: `[man, ride, horse]`.
pub fn canonical_key<S: AsRef<str>>(words: &[S]) -> String {
    let joined: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(", "))
}

// ============================================================================
// Tuple Set
// ============================================================================

/// A proposition with its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub proposition: Proposition,
    pub weight: f64,
}

impl Tuple {
    fn new(proposition: Proposition) -> Self {
        Self {
            proposition,
            weight: 1.0,
        }
    }
}

/// One proposition of the detailed output with whether it was matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleJudgment {
    pub tuple: Vec<String>,
    pub truth_value: bool,
}

/// Deduplicated collection of weighted propositions.
///
/// No two members are exact-equal: inserting a proposition that matches an
/// existing member merges it into that member instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupleSet {
    tuples: Vec<Tuple>,
}

impl TupleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every proposition of `graph`.
    pub fn from_graph(graph: &SceneGraph) -> Self {
        Self::from_propositions(graph.propositions())
    }

    /// The propositions of `graph` accepted by `filter`.
    ///
    /// Filtering happens before deduplication, so a rejected proposition can
    /// never be merged into an accepted one.
    pub fn from_graph_filtered(graph: &SceneGraph, filter: &dyn TupleFilter) -> Self {
        Self::from_propositions(graph.propositions().into_iter().filter(|p| filter.matches(p)))
    }

    pub fn from_propositions(propositions: impl IntoIterator<Item = Proposition>) -> Self {
        let mut set = Self::new();
        for proposition in propositions {
            set.insert(proposition);
        }
        set
    }

    /// Adds a proposition, merging it into an exact-equal member if one
    /// exists. Returns true if a new member was created.
    pub fn insert(&mut self, proposition: Proposition) -> bool {
        let Some(pos) = self.position_of(&proposition, None) else {
            self.tuples.push(Tuple::new(proposition));
            return true;
        };
        if self.tuples[pos].proposition.merge_in_place(&proposition) {
            self.coalesce(pos);
        }
        false
    }

    /// Overwrites every weight with the table's weight for that proposition.
    pub fn set_weights(&mut self, weights: &dyn DocumentFrequency) {
        for tuple in &mut self.tuples {
            tuple.weight = weights.weight_for(&tuple.proposition).max(0.0);
        }
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Sum of member weights.
    pub fn weighted_len(&self) -> f64 {
        self.tuples.iter().map(|t| t.weight).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tuple> {
        self.tuples.get(index)
    }

    /// Members labelled with the matching flags from an [`Alignment`].
    pub fn judgments(&self, matched: &[bool]) -> Vec<TupleJudgment> {
        self.tuples
            .iter()
            .enumerate()
            .map(|(i, t)| TupleJudgment {
                tuple: t.proposition.labels(),
                truth_value: matched.get(i).copied().unwrap_or(false),
            })
            .collect()
    }

    fn position_of(&self, proposition: &Proposition, skip: Option<usize>) -> Option<usize> {
        (0..self.tuples.len())
            .find(|&i| Some(i) != skip && self.tuples[i].proposition.matches(proposition))
    }

    /// A member that grew through a merge may now match another member;
    /// fold those in until the set is duplicate-free again.
    fn coalesce(&mut self, mut pos: usize) {
        while let Some(other) = self.position_of(&self.tuples[pos].proposition, Some(pos)) {
            let absorbed = self.tuples.remove(other);
            if other < pos {
                pos -= 1;
            }
            self.tuples[pos].proposition.merge_in_place(&absorbed.proposition);
        }
    }
}

impl<'a> IntoIterator for &'a TupleSet {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighting::UniformWeights;

    fn word(w: &str) -> Concept {
        Concept::word(w)
    }

    fn bus_graph(allow_merge: bool, candidate: bool) -> SceneGraph {
        let mut g = SceneGraph::new(allow_merge);
        if candidate {
            let bus = g.add_object(word("bus"));
            g.add_attribute(bus, word("red"));
            let street = g.add_object(word("street"));
            g.add_relation(bus, street, word("on"));
            g.add_attribute(bus, word("double-decker"));
            let bus2 = g.add_object(word("bus"));
            g.add_attribute(bus2, word("double-decker"));
            g.add_relation(bus2, street, word("on"));
            g.add_object(word("bus"));
        } else {
            let bus = g.add_object(word("bus"));
            g.add_attribute(bus, word("red"));
            g.add_attribute(bus, word("double-decker"));
            let street = g.add_object(word("street"));
            g.add_relation(bus, street, word("on"));
        }
        g
    }

    #[test]
    fn test_proposition_equivalence() {
        let dog = Concept::new("dog", [10]);
        let cat = Concept::new("cat", [11]);
        let blue = Concept::new("blue", [1]);
        let azure = Concept::new("azure", [1]);
        let red = Concept::new("red", [2]);

        let blue_dog = Proposition::Attribute(dog.clone(), blue.clone());
        let azure_dog = Proposition::Attribute(dog.clone(), azure);
        let red_dog = Proposition::Attribute(dog.clone(), red);
        let blue_cat = Proposition::Attribute(cat, blue.clone());

        assert!(blue_dog.matches(&Proposition::Attribute(dog.clone(), blue)));
        assert!(!blue_dog.matches(&azure_dog));
        assert!(!blue_dog.matches(&red_dog));
        assert!(!blue_dog.matches(&blue_cat));
        assert!(!blue_dog.matches(&Proposition::Object(dog)));

        assert!(blue_dog.similar_to(&azure_dog, &SharedSenses));
        assert!(!blue_dog.similar_to(&red_dog, &SharedSenses));
    }

    #[test]
    fn test_proposition_merge() {
        let dog = Concept::new("dog", [10]);
        let mut red_dog = Proposition::Attribute(dog.clone(), Concept::new("red", [2]));
        let blue_dog = Proposition::Attribute(dog, Concept::new("blue", [1]));
        assert!(red_dog.merge_in_place(&blue_dog));
        assert_eq!(red_dog.arity(), 2);
        assert_eq!(red_dog.labels(), vec!["dog".to_string(), "blue/red".to_string()]);

        let mut object = Proposition::Object(word("dog"));
        assert!(!object.merge_in_place(&blue_dog));
    }

    #[test]
    fn test_elementary_keys_expand_merged_slots() {
        let mut man = word("man");
        man.merge_in_place(&word("guy"));
        let p = Proposition::Relation(man, word("ride"), word("horse"));

        let keys = p.elementary_keys();
        assert_eq!(keys, vec!["[guy, ride, horse]", "[man, ride, horse]"]);
    }

    #[test]
    fn test_canonical_key_format() {
        assert_eq!(canonical_key(&["bus"]), "[bus]");
        assert_eq!(canonical_key(&["bus", "red"]), "[bus, red]");
    }

    #[test]
    fn test_tuple_set_deduplicates_in_both_graph_modes() {
        for allow_merge in [true, false] {
            let candidate = TupleSet::from_graph(&bus_graph(allow_merge, true));
            let reference = TupleSet::from_graph(&bus_graph(allow_merge, false));
            assert_eq!(candidate.len(), 5, "allow_merge = {allow_merge}");
            assert_eq!(reference.len(), 5, "allow_merge = {allow_merge}");

            let matched = count(&candidate, &reference, Equivalence::Exact);
            assert_eq!(matched.n, candidate.len());
        }
    }

    #[test]
    fn test_insert_coalesces_members_bridged_by_a_merge() {
        let mut set = TupleSet::new();
        assert!(set.insert(Proposition::Object(word("dog"))));
        assert!(set.insert(Proposition::Object(word("puppy"))));

        let mut bridge = word("dog");
        bridge.merge_in_place(&word("puppy"));
        assert!(!set.insert(Proposition::Object(bridge)));

        assert_eq!(set.len(), 1);
        let merged = set.get(0).map(|t| t.proposition.labels());
        assert_eq!(merged, Some(vec!["dog/puppy".to_string()]));
    }

    #[test]
    fn test_weights_default_and_overwrite() {
        let mut set = TupleSet::from_propositions([
            Proposition::Object(word("bus")),
            Proposition::Object(word("street")),
        ]);
        assert!((set.weighted_len() - 2.0).abs() < 1e-12);

        let half = |_: &Proposition| 0.5;
        set.set_weights(&half);
        assert!((set.weighted_len() - 1.0).abs() < 1e-12);

        set.set_weights(&UniformWeights);
        assert!((set.weighted_len() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_judgments_follow_flags() {
        let set = TupleSet::from_propositions([
            Proposition::Object(word("bus")),
            Proposition::Attribute(word("bus"), word("red")),
        ]);
        let judgments = set.judgments(&[true, false]);
        assert_eq!(judgments[0].tuple, vec!["bus"]);
        assert!(judgments[0].truth_value);
        assert_eq!(judgments[1].tuple, vec!["bus", "red"]);
        assert!(!judgments[1].truth_value);
    }
}
