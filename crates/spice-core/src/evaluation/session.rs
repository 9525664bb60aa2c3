//! Scoring session: per-item scoring and corpus aggregation.
//!
//! A session is configured once (category filters, document-frequency
//! weights, similarity oracle, detail level) and then fed items one at a
//! time. Each [`ScoringSession::score`] call appends one [`ItemScore`] to an
//! append-only log; aggregation reads that log.
//!
//! # Averaging
//!
//! | View | Counts | Ratios |
//! |------|--------|--------|
//! | Macro | summed over every item | mean over items with a defined record |
//! | Micro | summed over every item | recomputed from the summed counts |
//!
//! The micro-averaged `"All"` F-score is the corpus SPICE score.
//!
//! # Example
//!
//! ```
//! use spice_core::evaluation::ScoringSession;
//! use spice_core::filter::FilterRegistry;
//! use spice_core::graph::{Concept, SceneGraph};
//!
//! let mut candidate = SceneGraph::new(true);
//! let bus = candidate.add_object(Concept::word("bus"));
//! candidate.add_attribute(bus, Concept::word("red"));
//!
//! let mut reference = SceneGraph::new(true);
//! let bus = reference.add_object(Concept::word("bus"));
//! reference.add_attribute(bus, Concept::word("yellow"));
//!
//! let mut session = ScoringSession::new(FilterRegistry::standard());
//! session.score(1, &candidate, &reference, false);
//!
//! assert_eq!(session.spice(), Some(0.5));
//! ```

use super::record::{Counts, Evaluation, Ratios, WeightedCounts};
use super::stats::{bootstrap_ci, BootstrapResult};
use crate::config::ALL_CATEGORY;
use crate::error::ScoringError;
use crate::filter::FilterRegistry;
use crate::graph::SceneGraph;
use crate::tuples::{
    align, Equivalence, SharedSenses, SimilarityOracle, TupleJudgment, TupleSet,
};
use crate::weighting::{DocumentFrequency, UniformWeights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Item Scores
// ============================================================================

/// Caller-supplied item identifier, numeric (COCO image ids) or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageId {
    Number(u64),
    Text(String),
}

impl From<u64> for ImageId {
    fn from(id: u64) -> Self {
        ImageId::Number(id)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        ImageId::Text(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        ImageId::Text(id)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageId::Number(n) => write!(f, "{n}"),
            ImageId::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub image_id: ImageId,
    /// `"All"` plus one record per registered category.
    pub scores: BTreeMap<String, Evaluation>,
    /// Candidate propositions with their match flags (detailed mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_tuples: Option<Vec<TupleJudgment>>,
    /// Reference propositions with their match flags (detailed mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_tuples: Option<Vec<TupleJudgment>>,
}

impl ItemScore {
    pub fn score(&self, category: &str) -> Option<&Evaluation> {
        self.scores.get(category)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Scores items and aggregates their records.
pub struct ScoringSession {
    filters: Arc<FilterRegistry>,
    weights: Arc<dyn DocumentFrequency>,
    oracle: Arc<dyn SimilarityOracle>,
    detailed: bool,
    items: Vec<ItemScore>,
}

impl ScoringSession {
    /// A session with uniform weights and the [`SharedSenses`] oracle.
    pub fn new(filters: impl Into<Arc<FilterRegistry>>) -> Self {
        Self {
            filters: filters.into(),
            weights: Arc::new(UniformWeights),
            oracle: Arc::new(SharedSenses),
            detailed: false,
            items: Vec::new(),
        }
    }

    /// Weights propositions with `weights` instead of 1.0.
    pub fn with_weights(mut self, weights: Arc<dyn DocumentFrequency>) -> Self {
        self.weights = weights;
        self
    }

    /// Oracle used when scoring with synonyms.
    pub fn with_oracle(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Keeps the "All" tuple sets of every item, with match flags.
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// `"All"` followed by the registered categories.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ALL_CATEGORY).chain(self.filters.names())
    }

    /// Scores one item and appends it to the log.
    pub fn score(
        &mut self,
        image_id: impl Into<ImageId>,
        candidate: &SceneGraph,
        reference: &SceneGraph,
        use_synonyms: bool,
    ) -> &ItemScore {
        let item = self.evaluate(image_id.into(), candidate, reference, use_synonyms);
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    fn evaluate(
        &self,
        image_id: ImageId,
        candidate: &SceneGraph,
        reference: &SceneGraph,
        use_synonyms: bool,
    ) -> ItemScore {
        let equivalence = if use_synonyms {
            Equivalence::Similar(&*self.oracle)
        } else {
            Equivalence::Exact
        };
        let weighted = |mut set: TupleSet| {
            set.set_weights(&*self.weights);
            set
        };

        let test = weighted(TupleSet::from_graph(candidate));
        let refs = weighted(TupleSet::from_graph(reference));
        let alignment = align(&test, &refs, equivalence);

        let mut scores = BTreeMap::new();
        let all = Evaluation::from_alignment(&test, &refs, &alignment, false);
        scores.insert(ALL_CATEGORY.to_string(), all);

        for (name, filter) in self.filters.iter() {
            let test = weighted(TupleSet::from_graph_filtered(candidate, filter));
            let refs = weighted(TupleSet::from_graph_filtered(reference, filter));
            let filtered = align(&test, &refs, equivalence);
            scores.insert(
                name.to_string(),
                Evaluation::from_alignment(&test, &refs, &filtered, true),
            );
        }

        debug!(
            "Scored {}: {} test / {} ref tuples, {} matched",
            image_id,
            test.len(),
            refs.len(),
            alignment.count.n
        );

        let (test_tuples, ref_tuples) = if self.detailed {
            (
                Some(test.judgments(&alignment.candidate_matched())),
                Some(refs.judgments(&alignment.reference_matched())),
            )
        } else {
            (None, None)
        };

        ItemScore {
            image_id,
            scores,
            test_tuples,
            ref_tuples,
        }
    }

    pub fn items(&self) -> &[ItemScore] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_category(&self, category: &str) -> Result<(), ScoringError> {
        if self.filters.contains(category) {
            Ok(())
        } else {
            Err(ScoringError::UnknownCategory(category.to_string()))
        }
    }

    /// Sums counts over every item and averages ratios over the items whose
    /// record is defined. `num_images` is the number of defined items.
    ///
    /// # Errors
    ///
    /// [`ScoringError::UnknownCategory`] if `category` is neither `"All"`
    /// nor registered.
    pub fn macro_average(&self, category: &str) -> Result<Evaluation, ScoringError> {
        self.check_category(category)?;

        let mut counts = Counts::default();
        let mut weighted = WeightedCounts::default();
        let mut ratio_sum = Ratios::default();
        let mut defined = 0usize;

        for record in self.items.iter().filter_map(|item| item.score(category)) {
            counts += record.counts;
            weighted += record.weighted;
            if let Some(ratios) = record.ratios {
                ratio_sum += ratios;
                defined += 1;
            }
        }

        Ok(Evaluation {
            counts,
            weighted,
            ratios: (defined > 0).then(|| ratio_sum / defined as f64),
            num_images: defined,
        })
    }

    /// Macro-average counts with ratios recomputed from those counts.
    ///
    /// Ratios are undefined only when no item had a defined record, i.e.
    /// the corpus holds no reference propositions in this category.
    pub fn micro_average(&self, category: &str) -> Result<Evaluation, ScoringError> {
        let mut aggregate = self.macro_average(category)?;
        aggregate.recompute_ratios(aggregate.num_images == 0);
        Ok(aggregate)
    }

    /// The corpus SPICE score: micro-averaged `"All"` F-score.
    pub fn spice(&self) -> Option<f64> {
        self.micro_average(ALL_CATEGORY).ok()?.f()
    }

    /// Defined per-item F-scores for `category`, in log order.
    pub fn f_scores(&self, category: &str) -> Result<Vec<f64>, ScoringError> {
        self.check_category(category)?;
        Ok(self
            .items
            .iter()
            .filter_map(|item| item.score(category)?.f())
            .collect())
    }

    /// Bootstrap interval of the mean per-item F-score for `category`.
    ///
    /// `Ok(None)` when no item has a defined score.
    pub fn confidence_interval(
        &self,
        category: &str,
        samples: usize,
        seed: u64,
    ) -> Result<Option<BootstrapResult>, ScoringError> {
        Ok(bootstrap_ci(&self.f_scores(category)?, samples, seed))
    }

    /// Multi-line report of the macro averages of every category.
    pub fn report(&self) -> String {
        self.to_string()
    }

    /// The item log as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items)
    }
}

impl fmt::Display for ScoringSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "********  SPICE Evaluation  ********")?;
        for category in self.categories() {
            let average = self.macro_average(category).map_err(|_| fmt::Error)?;
            write!(f, "\n{category} tuples\n{average}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScoringSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringSession")
            .field("filters", &self.filters)
            .field("detailed", &self.detailed)
            .field("items", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Concept;

    fn car(colors: &[&str]) -> SceneGraph {
        let mut graph = SceneGraph::new(true);
        let car = graph.add_object(Concept::word("car"));
        for color in colors {
            graph.add_attribute(car, Concept::word(*color));
        }
        graph
    }

    fn bus_scene() -> SceneGraph {
        let mut graph = SceneGraph::new(true);
        let bus = graph.add_object(Concept::word("bus"));
        let street = graph.add_object(Concept::word("street"));
        graph.add_attribute(bus, Concept::word("red"));
        graph.add_attribute(bus, Concept::word("double-decker"));
        graph.add_relation(bus, street, Concept::word("on"));
        graph
    }

    #[test]
    fn test_identical_graphs_score_one() {
        let mut session = ScoringSession::new(FilterRegistry::standard());
        let item = session.score(1, &bus_scene(), &bus_scene(), false);

        let all = item.score("All").unwrap();
        assert_eq!(all.counts.true_pos, 5);
        assert_eq!(all.counts.false_pos, 0);
        assert_eq!(all.counts.false_neg, 0);
        assert_eq!(all.f(), Some(1.0));
        assert_eq!(item.score("Relation").unwrap().counts.true_pos, 1);
        assert!(item.score("Size").unwrap().is_undefined());
        assert_eq!(session.spice(), Some(1.0));
    }

    #[test]
    fn test_category_records_exist_for_every_filter() {
        let mut session = ScoringSession::new(FilterRegistry::standard());
        let item = session.score("a", &car(&["red"]), &car(&["blue"]), false);
        let categories: Vec<&str> = item.scores.keys().map(String::as_str).collect();
        assert_eq!(
            categories,
            vec!["All", "Attribute", "Color", "Count", "Object", "Relation", "Size"]
        );
    }

    #[test]
    fn test_macro_average_skips_undefined_items() {
        let mut session = ScoringSession::new(FilterRegistry::standard());
        session.score(
            1,
            &car(&["red", "blue", "green", "white", "black"]),
            &car(&["red", "blue", "green", "pink", "purple"]),
            false,
        );
        session.score(2, &car(&["red"]), &car(&[]), false);

        let color = session.macro_average("Color").unwrap();
        assert_eq!(color.num_images, 1);
        assert!((color.f().unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(color.counts.true_pos, 3);
        assert_eq!(color.counts.false_pos, 3);
        assert_eq!(color.counts.false_neg, 2);
    }

    #[test]
    fn test_micro_average_recomputes_from_counts() {
        let mut session = ScoringSession::new(FilterRegistry::new());
        // 1 of 1 matched, then 1 of 3 matched.
        session.score(1, &car(&[]), &car(&[]), false);
        session.score(2, &car(&["red", "blue"]), &car(&["pink", "teal"]), false);

        let macro_all = session.macro_average("All").unwrap();
        let micro_all = session.micro_average("All").unwrap();

        assert!((macro_all.f().unwrap() - (1.0 + 1.0 / 3.0) / 2.0).abs() < 1e-9);
        assert!((micro_all.pr().unwrap() - 0.5).abs() < 1e-9);
        assert!((micro_all.f().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(micro_all.counts, macro_all.counts);
        assert_eq!(micro_all.num_images, 2);
    }

    #[test]
    fn test_empty_session_aggregates_to_undefined() {
        let session = ScoringSession::new(FilterRegistry::standard());
        for category in ["All", "Color"] {
            let average = session.macro_average(category).unwrap();
            assert_eq!(average.num_images, 0);
            assert!(average.is_undefined());
            assert!(session.micro_average(category).unwrap().is_undefined());
        }
        assert_eq!(session.spice(), None);
        assert!(session.confidence_interval("All", 100, 1).unwrap().is_none());
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let session = ScoringSession::new(FilterRegistry::new());
        assert_eq!(
            session.macro_average("Color"),
            Err(ScoringError::UnknownCategory("Color".to_string()))
        );
        assert!(session.f_scores("Novel").is_err());
    }

    #[test]
    fn test_synonym_mode_uses_oracle() {
        let mut candidate = SceneGraph::new(true);
        candidate.add_object(Concept::new("kitten", [7]));
        let mut reference = SceneGraph::new(true);
        reference.add_object(Concept::new("cat", [7]));

        let mut session = ScoringSession::new(FilterRegistry::new());
        assert_eq!(session.score(1, &candidate, &reference, false).scores["All"].f(), Some(0.0));
        assert_eq!(session.score(2, &candidate, &reference, true).scores["All"].f(), Some(1.0));
    }

    #[test]
    fn test_weights_flow_into_weighted_counts() {
        let doubled: Arc<dyn DocumentFrequency> =
            Arc::new(|p: &crate::tuples::Proposition| p.arity() as f64);
        let mut session = ScoringSession::new(FilterRegistry::new()).with_weights(doubled);
        let item = session.score(1, &car(&["red"]), &car(&["blue"]), false);

        let all = item.score("All").unwrap();
        assert_eq!(all.weighted.true_pos, 1.0);
        assert_eq!(all.weighted.false_pos, 2.0);
        assert_eq!(all.weighted.false_neg, 2.0);
        assert!((all.wpr().unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_detailed_mode_keeps_truth_values() {
        let mut session = ScoringSession::new(FilterRegistry::new()).detailed(true);
        let item = session.score(9, &car(&["red"]), &car(&["blue"]), false);

        let test = item.test_tuples.as_ref().unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(test[0].tuple, vec!["car"]);
        assert!(test[0].truth_value);
        assert_eq!(test[1].tuple, vec!["car", "red"]);
        assert!(!test[1].truth_value);
        assert_eq!(item.ref_tuples.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_plain_mode_omits_tuples_from_json() {
        let mut session = ScoringSession::new(FilterRegistry::new());
        session.score(3, &car(&[]), &car(&[]), false);
        let json = session.to_json().unwrap();
        assert!(!json.contains("test_tuples"));
        assert!(json.contains("\"image_id\": 3"));
    }

    #[test]
    fn test_report_lists_all_categories() {
        let mut session = ScoringSession::new(FilterRegistry::standard());
        session.score(1, &bus_scene(), &bus_scene(), false);
        let report = session.report();

        assert!(report.starts_with("********  SPICE Evaluation  ********\n\nAll tuples\n"));
        for category in ["Object", "Attribute", "Relation", "Color", "Count", "Size"] {
            assert!(report.contains(&format!("\n{category} tuples\n")), "{category}");
        }
        assert!(report.contains("  f-score:\t1.000 (SPICE metric)"));
        assert!(report.contains("  f-score:\tNaN (SPICE metric)"));
        assert_eq!(report, session.report());
    }
}
