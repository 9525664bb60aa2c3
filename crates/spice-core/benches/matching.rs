//! Benchmarks for the match counter and per-item scoring.
//!
//! Run with: `cargo bench -p spice-core --bench matching`
//!
//! These benchmarks measure:
//! - Maximum matching between tuple sets of increasing size
//! - Exact vs synonym-aware equivalence
//! - A full `ScoringSession::score` call with the standard categories

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spice_core::evaluation::ScoringSession;
use spice_core::filter::FilterRegistry;
use spice_core::graph::{Concept, SceneGraph};
use spice_core::tuples::{count, Equivalence, SharedSenses, TupleSet};

// =============================================================================
// Test Data Generation
// =============================================================================

const NOUNS: &[&str] = &[
    "man", "woman", "dog", "horse", "bus", "street", "tree", "table", "plate", "cat", "bench",
    "kite", "beach", "train", "car", "bicycle",
];
const ATTRIBUTES: &[&str] = &["red", "small", "two", "wooden", "white", "large", "old", "blue"];
const RELATIONS: &[&str] = &["on", "near", "holding", "riding", "behind", "in"];

/// Deterministic scene graph with `objects` nodes.
///
/// `offset` shifts the vocabulary so candidate and reference overlap only
/// partially.
fn scene(objects: usize, offset: usize) -> SceneGraph {
    let mut graph = SceneGraph::new(true);
    let ids: Vec<_> = (0..objects)
        .map(|i| {
            let word = NOUNS[(i + offset) % NOUNS.len()];
            graph.add_object(Concept::new(word, [(i + offset) as u32 % 5]))
        })
        .collect();
    for (i, &id) in ids.iter().enumerate() {
        let attribute = ATTRIBUTES[(i * 3 + offset) % ATTRIBUTES.len()];
        graph.add_attribute(id, Concept::word(attribute));
        if i + 1 < ids.len() {
            let relation = RELATIONS[(i + offset) % RELATIONS.len()];
            graph.add_relation(id, ids[i + 1], Concept::word(relation));
        }
    }
    graph
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");

    for objects in [4, 8, 16] {
        let candidate = TupleSet::from_graph(&scene(objects, 0));
        let reference = TupleSet::from_graph(&scene(objects, 2));
        group.throughput(Throughput::Elements((candidate.len() * reference.len()) as u64));

        group.bench_with_input(BenchmarkId::new("exact", objects), &objects, |b, _| {
            b.iter(|| count(black_box(&candidate), black_box(&reference), Equivalence::Exact))
        });
        group.bench_with_input(BenchmarkId::new("synonyms", objects), &objects, |b, _| {
            b.iter(|| {
                count(
                    black_box(&candidate),
                    black_box(&reference),
                    Equivalence::Similar(&SharedSenses),
                )
            })
        });
    }

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let candidate = scene(8, 0);
    let reference = scene(12, 1);

    c.bench_function("score_item_standard_categories", |b| {
        b.iter(|| {
            let mut session = ScoringSession::new(FilterRegistry::standard());
            session.score(1, black_box(&candidate), black_box(&reference), false);
            session.spice()
        })
    });
}

criterion_group!(benches, bench_count, bench_score);
criterion_main!(benches);
