//! Output formatting for scoring runs.
//!
//! Supports both the human-readable report and a JSON summary for scripting.
//! The per-item score log is written separately (`--output`).

use serde::{Serialize, Serializer};
use spice_core::config::ALL_CATEGORY;
use spice_core::evaluation::{
    cohens_d, interpret_cohens_d, paired_ttest, BootstrapResult, Evaluation, ImageId, ItemScore,
    ScoringSession, TTestResult,
};
use spice_core::ScoringError;
use std::collections::{BTreeMap, HashMap};

/// JSON summary of a scoring run.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub num_items: usize,
    /// Micro-averaged "All" F-score
    #[serde(serialize_with = "score_or_nan")]
    pub spice: Option<f64>,
    /// Bootstrap interval of the per-item "All" F-scores
    pub confidence_interval: Option<BootstrapResult>,
    pub categories: BTreeMap<String, CategorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    /// Items with a defined score in this category
    pub num_images: usize,
    pub macro_average: Evaluation,
    pub micro_average: Evaluation,
}

/// Per-item "All" F-scores of this run against a baseline score log.
#[derive(Debug, Serialize)]
pub struct Comparison {
    pub baseline: String,
    /// Items scored by both runs with a defined F-score in each
    pub shared_items: usize,
    /// `None` when no items are shared
    #[serde(serialize_with = "score_or_nan")]
    pub mean_f: Option<f64>,
    #[serde(serialize_with = "score_or_nan")]
    pub baseline_mean_f: Option<f64>,
    /// `None` with fewer than two shared items
    pub t_test: Option<TTestResult>,
    pub effect_size: f64,
    pub effect: &'static str,
}

fn score_or_nan<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str("NaN"),
    }
}

fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "NaN".to_string(),
    }
}

/// Collects macro and micro averages of every category.
pub fn summarize(
    session: &ScoringSession,
    bootstrap_samples: usize,
    seed: u64,
    comparison: Option<Comparison>,
) -> Result<Summary, ScoringError> {
    let mut categories = BTreeMap::new();
    for category in session.categories() {
        let macro_average = session.macro_average(category)?;
        categories.insert(
            category.to_string(),
            CategorySummary {
                num_images: macro_average.num_images,
                macro_average,
                micro_average: session.micro_average(category)?,
            },
        );
    }

    Ok(Summary {
        num_items: session.len(),
        spice: session.spice(),
        confidence_interval: session.confidence_interval(ALL_CATEGORY, bootstrap_samples, seed)?,
        categories,
        comparison,
    })
}

fn all_f(item: &ItemScore) -> Option<f64> {
    item.score(ALL_CATEGORY)?.f()
}

/// Pairs items by image id and compares their "All" F-scores.
pub fn compare(name: &str, current: &[ItemScore], baseline: &[ItemScore]) -> Comparison {
    let baseline_f: HashMap<&ImageId, f64> = baseline
        .iter()
        .filter_map(|item| Some((&item.image_id, all_f(item)?)))
        .collect();

    let (ours, theirs): (Vec<f64>, Vec<f64>) = current
        .iter()
        .filter_map(|item| Some((all_f(item)?, *baseline_f.get(&item.image_id)?)))
        .unzip();

    let mean = |values: &[f64]| {
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    };
    let effect_size = cohens_d(&ours, &theirs);

    Comparison {
        baseline: name.to_string(),
        shared_items: ours.len(),
        mean_f: mean(&ours),
        baseline_mean_f: mean(&theirs),
        t_test: paired_ttest(&ours, &theirs),
        effect_size,
        effect: interpret_cohens_d(effect_size),
    }
}

/// Prints the text report followed by the corpus score.
pub fn print_report(session: &ScoringSession, summary: &Summary) {
    print!("{}", session.report());

    println!("\n{}", "=".repeat(40));
    print!("SPICE: {}", format_score(summary.spice));
    match &summary.confidence_interval {
        Some(ci) => println!("  (mean per-item F {})", ci.format(3)),
        None => println!(),
    }

    if let Some(c) = &summary.comparison {
        println!("\nBaseline: {} ({} shared items)", c.baseline, c.shared_items);
        println!(
            "  mean F: {} vs {}",
            format_score(c.mean_f),
            format_score(c.baseline_mean_f)
        );
        match &c.t_test {
            Some(t) => println!("  paired t-test: {}", t.format()),
            None => println!("  paired t-test: not enough shared items"),
        }
        println!("  effect size: d={:.3} ({})", c.effect_size, c.effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spice_core::filter::FilterRegistry;
    use spice_core::graph::{Concept, SceneGraph};

    fn scene(words: &[&str]) -> SceneGraph {
        let mut graph = SceneGraph::new(true);
        for word in words {
            graph.add_object(Concept::word(*word));
        }
        graph
    }

    fn session(candidates: &[&[&str]]) -> ScoringSession {
        let reference = scene(&["dog", "ball", "grass", "tree"]);
        let mut session = ScoringSession::new(FilterRegistry::standard());
        for (i, words) in candidates.iter().enumerate() {
            session.score(i as u64, &scene(words), &reference, false);
        }
        session
    }

    #[test]
    fn test_summary_covers_every_category() {
        let session = session(&[&["dog", "ball"], &["dog", "cat"]]);
        let summary = summarize(&session, 200, 1, None).unwrap();

        assert_eq!(summary.num_items, 2);
        assert_eq!(summary.categories.len(), 7);
        assert_eq!(summary.categories["All"].num_images, 2);
        assert_eq!(summary.categories["Color"].num_images, 0);
        assert!(summary.spice.is_some());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["categories"]["Color"]["macro_average"]["f"], "NaN");
        assert!(json.get("comparison").is_none());
    }

    #[test]
    fn test_empty_run_reports_nan() {
        let session = session(&[]);
        let summary = summarize(&session, 200, 1, None).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["spice"], "NaN");
        assert!(json["confidence_interval"].is_null());
    }

    #[test]
    fn test_compare_pairs_by_image_id() {
        let better = session(&[&["dog", "ball"], &["dog", "ball", "grass"], &["tree"]]);
        let worse = session(&[&["dog", "cat"], &["cow", "grass"], &["tree", "sky"]]);

        let comparison = compare("baseline.json", better.items(), worse.items());
        assert_eq!(comparison.shared_items, 3);
        assert!(comparison.mean_f.unwrap() > comparison.baseline_mean_f.unwrap());
        assert!(comparison.effect_size > 0.0);
        assert!(comparison.t_test.is_some());
    }

    #[test]
    fn test_compare_ignores_unshared_items() {
        let current = session(&[&["dog"]]);
        let baseline = session(&[]);
        let comparison = compare("empty", current.items(), baseline.items());
        assert_eq!(comparison.shared_items, 0);
        assert!(comparison.t_test.is_none());
        assert!(comparison.mean_f.is_none());

        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["mean_f"], "NaN");
        assert_eq!(json["baseline_mean_f"], "NaN");
        assert!(json["t_test"].is_null());
    }
}
