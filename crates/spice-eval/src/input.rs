//! Input files: scene graph items, novelty training tuples, baseline logs.
//!
//! # Item Format
//!
//! ```text
//! [
//!   {
//!     "image_id": 42,
//!     "test": {
//!       "objects":    [{"names": ["bus"], "senses": [2924116]}, {"names": ["street"]}],
//!       "attributes": [{"object": 0, "names": ["red"]}],
//!       "relations":  [{"subject": 0, "object": 1, "names": ["on"]}]
//!     },
//!     "refs": [ { ...same shape... }, ... ]
//!   }
//! ]
//! ```
//!
//! `object` and `subject` index into the graph's own `objects` list. A
//! concept with several names is the merge of those word forms.

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use spice_core::evaluation::{ImageId, ItemScore};
use spice_core::filter::NoveltyFilter;
use spice_core::graph::{Concept, SceneGraph, SenseId};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct ConceptSpec {
    pub names: Vec<String>,
    #[serde(default)]
    pub senses: Vec<SenseId>,
}

impl ConceptSpec {
    fn to_concept(&self) -> Result<Concept> {
        let Some((first, rest)) = self.names.split_first() else {
            bail!("concept has no names");
        };
        let mut concept = Concept::new(first.as_str(), self.senses.iter().copied());
        for name in rest {
            concept.merge_in_place(&Concept::word(name.as_str()));
        }
        Ok(concept)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeSpec {
    pub object: usize,
    #[serde(flatten)]
    pub concept: ConceptSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationSpec {
    pub subject: usize,
    pub object: usize,
    #[serde(flatten)]
    pub concept: ConceptSpec,
}

/// One scene graph as written by the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub objects: Vec<ConceptSpec>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

impl GraphSpec {
    /// Builds a scene graph, rejecting dangling object indices and
    /// nameless concepts.
    pub fn build(&self, allow_merge: bool) -> Result<SceneGraph> {
        let mut graph = SceneGraph::new(allow_merge);
        let mut ids = Vec::with_capacity(self.objects.len());
        for (i, spec) in self.objects.iter().enumerate() {
            let concept = spec.to_concept().with_context(|| format!("object {i}"))?;
            ids.push(graph.add_object(concept));
        }
        let node = |index: usize| {
            ids.get(index).copied().ok_or_else(|| {
                anyhow!("object index {index} out of range ({} objects)", ids.len())
            })
        };

        for (i, spec) in self.attributes.iter().enumerate() {
            let object = node(spec.object).with_context(|| format!("attribute {i}"))?;
            let attribute = spec.concept.to_concept().with_context(|| format!("attribute {i}"))?;
            graph.add_attribute(object, attribute);
        }
        for (i, spec) in self.relations.iter().enumerate() {
            let subject = node(spec.subject).with_context(|| format!("relation {i}"))?;
            let object = node(spec.object).with_context(|| format!("relation {i}"))?;
            let relation = spec.concept.to_concept().with_context(|| format!("relation {i}"))?;
            graph.add_relation(subject, object, relation);
        }
        Ok(graph)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub image_id: ImageId,
    pub test: GraphSpec,
    pub refs: Vec<GraphSpec>,
}

/// A candidate graph and the merged graph of all its references.
#[derive(Debug, Clone)]
pub struct Item {
    pub image_id: ImageId,
    pub test: SceneGraph,
    pub reference: SceneGraph,
}

impl ItemSpec {
    pub fn build(&self, allow_merge: bool) -> Result<Item> {
        let test = self
            .test
            .build(allow_merge)
            .with_context(|| format!("image {}: candidate graph", self.image_id))?;
        let mut reference = SceneGraph::new(allow_merge);
        for (i, spec) in self.refs.iter().enumerate() {
            let graph = spec
                .build(allow_merge)
                .with_context(|| format!("image {}: reference graph {i}", self.image_id))?;
            reference.merge_graph(&graph);
        }
        Ok(Item {
            image_id: self.image_id.clone(),
            test,
            reference,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads and builds every item of an input file.
pub fn load_items(path: &Path, allow_merge: bool) -> Result<Vec<Item>> {
    let specs: Vec<ItemSpec> = read_json(path)?;
    specs.iter().map(|spec| spec.build(allow_merge)).collect()
}

/// Builds one novelty filter from training tuple files.
///
/// Each file is a JSON array of elementary tuples (`[["man"], ["horse",
/// "brown"], ...]`); filters built per file are merged.
pub fn load_novelty_filter(paths: &[PathBuf]) -> Result<NoveltyFilter> {
    let mut filter = NoveltyFilter::new();
    for path in paths {
        let tuples: Vec<Vec<String>> = read_json(path)?;
        filter.merge(&NoveltyFilter::from_tuples(&path.display().to_string(), tuples));
    }
    Ok(filter)
}

/// Reads a score log previously written with `--output`.
pub fn load_score_log(path: &Path) -> Result<Vec<ItemScore>> {
    read_json(path)
}
