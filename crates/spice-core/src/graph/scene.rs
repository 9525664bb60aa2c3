//! Arena-backed scene graph.
//!
//! Objects, attributes and relations refer to concepts by index into a single
//! arena owned by the graph. Merge mode folds a repeated mention into the
//! existing node instead of creating a new one, so every proposition that
//! refers to that node sees the merged concept.

use super::concept::Concept;
use crate::tuples::Proposition;

/// Index of a concept in the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConceptId(usize);

/// Index of an object node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

#[derive(Debug, Clone)]
struct AttributeEdge {
    object: ObjectId,
    attribute: ConceptId,
}

#[derive(Debug, Clone)]
struct RelationEdge {
    subject: ObjectId,
    object: ObjectId,
    relation: ConceptId,
}

/// Objects, attributes and relations extracted from one description.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    concepts: Vec<Concept>,
    objects: Vec<ConceptId>,
    attributes: Vec<AttributeEdge>,
    relations: Vec<RelationEdge>,
    allow_merge: bool,
}

impl SceneGraph {
    /// Creates an empty graph. With `allow_merge`, repeated mentions of an
    /// object (or of the same attribute/relation on it) are merged.
    pub fn new(allow_merge: bool) -> Self {
        Self {
            allow_merge,
            ..Self::default()
        }
    }

    pub fn allows_merge(&self) -> bool {
        self.allow_merge
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Concept of an object node.
    pub fn object(&self, id: ObjectId) -> &Concept {
        self.concept(self.objects[id.0])
    }

    /// First object whose concept carries `word`.
    pub fn find_object(&self, word: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|&c| self.concept(c).words().contains(word))
            .map(ObjectId)
    }

    /// Adds an object node, or merges into an existing one in merge mode.
    pub fn add_object(&mut self, concept: Concept) -> ObjectId {
        if self.allow_merge {
            if let Some(pos) = self
                .objects
                .iter()
                .position(|&c| self.concept(c).matches(&concept))
            {
                self.merge_concept(self.objects[pos], &concept);
                return ObjectId(pos);
            }
        }
        let id = self.push_concept(concept);
        self.objects.push(id);
        ObjectId(self.objects.len() - 1)
    }

    /// Attaches an attribute to an object.
    pub fn add_attribute(&mut self, object: ObjectId, attribute: Concept) {
        if self.allow_merge {
            let existing = self
                .attributes
                .iter()
                .find(|e| e.object == object && self.concept(e.attribute).matches(&attribute))
                .map(|e| e.attribute);
            if let Some(id) = existing {
                self.merge_concept(id, &attribute);
                return;
            }
        }
        let attribute = self.push_concept(attribute);
        self.attributes.push(AttributeEdge { object, attribute });
    }

    /// Adds a directed relation `subject --relation--> object`.
    pub fn add_relation(&mut self, subject: ObjectId, object: ObjectId, relation: Concept) {
        if self.allow_merge {
            let existing = self
                .relations
                .iter()
                .find(|e| {
                    e.subject == subject
                        && e.object == object
                        && self.concept(e.relation).matches(&relation)
                })
                .map(|e| e.relation);
            if let Some(id) = existing {
                self.merge_concept(id, &relation);
                return;
            }
        }
        let relation = self.push_concept(relation);
        self.relations.push(RelationEdge {
            subject,
            object,
            relation,
        });
    }

    /// Copies every node and edge of `other` into this graph.
    ///
    /// Used to combine several reference descriptions of one image into a
    /// single reference graph. Merge mode of `self` applies.
    pub fn merge_graph(&mut self, other: &SceneGraph) {
        let remap: Vec<ObjectId> = other
            .objects
            .iter()
            .map(|&c| self.add_object(other.concept(c).clone()))
            .collect();
        for edge in &other.attributes {
            self.add_attribute(remap[edge.object.0], other.concept(edge.attribute).clone());
        }
        for edge in &other.relations {
            self.add_relation(
                remap[edge.subject.0],
                remap[edge.object.0],
                other.concept(edge.relation).clone(),
            );
        }
    }

    /// Resolves every node and edge into an owned proposition.
    ///
    /// Order: objects, then attributes, then relations, each in insertion order.
    pub fn propositions(&self) -> Vec<Proposition> {
        let objects = self
            .objects
            .iter()
            .map(|&c| Proposition::Object(self.concept(c).clone()));
        let attributes = self.attributes.iter().map(|e| {
            Proposition::Attribute(
                self.object(e.object).clone(),
                self.concept(e.attribute).clone(),
            )
        });
        let relations = self.relations.iter().map(|e| {
            Proposition::Relation(
                self.object(e.subject).clone(),
                self.concept(e.relation).clone(),
                self.object(e.object).clone(),
            )
        });
        objects.chain(attributes).chain(relations).collect()
    }

    fn concept(&self, id: ConceptId) -> &Concept {
        &self.concepts[id.0]
    }

    fn push_concept(&mut self, concept: Concept) -> ConceptId {
        self.concepts.push(concept);
        ConceptId(self.concepts.len() - 1)
    }

    fn merge_concept(&mut self, id: ConceptId, other: &Concept) {
        self.concepts[id.0].merge_in_place(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_mode_folds_repeated_mentions() {
        let mut graph = SceneGraph::new(true);
        let bus = graph.add_object(Concept::word("bus"));
        let again = graph.add_object(Concept::word("bus"));
        assert_eq!(bus, again);

        graph.add_attribute(bus, Concept::word("red"));
        graph.add_attribute(bus, Concept::word("red"));
        assert_eq!(graph.object_count(), 1);
        assert_eq!(graph.propositions().len(), 2);
    }

    #[test]
    fn test_without_merge_keeps_duplicates() {
        let mut graph = SceneGraph::new(false);
        let a = graph.add_object(Concept::word("bus"));
        let b = graph.add_object(Concept::word("bus"));
        assert_ne!(a, b);
        assert_eq!(graph.object_count(), 2);
    }

    #[test]
    fn test_merged_object_is_seen_by_every_edge() {
        let mut graph = SceneGraph::new(true);
        let dog = graph.add_object(Concept::new("dog", [10]));
        graph.add_attribute(dog, Concept::word("brown"));
        graph.add_object(Concept::new("dog", [12]));

        let props = graph.propositions();
        match &props[1] {
            Proposition::Attribute(object, _) => {
                assert!(object.senses().contains(&12));
            }
            other => panic!("expected attribute, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_graph_remaps_objects() {
        let mut first = SceneGraph::new(true);
        let man = first.add_object(Concept::word("man"));
        let horse = first.add_object(Concept::word("horse"));
        first.add_relation(man, horse, Concept::word("ride"));

        let mut second = SceneGraph::new(true);
        let horse2 = second.add_object(Concept::word("horse"));
        second.add_attribute(horse2, Concept::word("brown"));

        first.merge_graph(&second);
        assert_eq!(first.object_count(), 2);
        assert_eq!(first.find_object("horse"), Some(horse));
        assert_eq!(first.propositions().len(), 4);
    }

    #[test]
    fn test_relation_order_is_subject_relation_object() {
        let mut graph = SceneGraph::new(true);
        let bus = graph.add_object(Concept::word("bus"));
        let street = graph.add_object(Concept::word("street"));
        graph.add_relation(bus, street, Concept::word("on"));

        let last = graph.propositions().pop();
        assert_eq!(
            last,
            Some(Proposition::Relation(
                Concept::word("bus"),
                Concept::word("on"),
                Concept::word("street"),
            ))
        );
    }
}
