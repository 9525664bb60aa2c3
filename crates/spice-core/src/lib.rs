//! # SPICE Core
//!
//! Scoring and aggregation engine for semantic propositional image caption
//! evaluation.
//!
//! Captions are compared as sets of propositions (objects, attributes and
//! relations) extracted from scene graphs rather than as text. This crate
//! takes already-built scene graphs and decides how many propositions
//! match, derives precision/recall/F-scores, splits them by category and
//! aggregates them over a corpus.
//!
//! ## Modules
//!
//! - [`graph`] - Concepts and arena-backed scene graphs
//! - [`tuples`] - Propositions, deduplicated tuple sets and the match counter
//! - [`weighting`] - Document-frequency weights for propositions
//! - [`filter`] - Category filters, including the novelty filter
//! - [`evaluation`] - Evaluation records, scoring session and statistics
//! - [`corpus`] - Caption corpus loading
//! - [`config`] - Shared constants
//! - [`error`] - Error types

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod filter;
pub mod graph;
pub mod tuples;
pub mod weighting;

pub use error::{CorpusError, ScoringError};
pub use evaluation::{Evaluation, ItemScore, ScoringSession};
