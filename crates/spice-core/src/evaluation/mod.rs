//! Evaluation records, the scoring session and significance statistics.
//!
//! # Overview
//!
//! - [`Evaluation`]: precision, recall and F-score (plain and weighted) for
//!   one comparison, or an aggregate over many
//! - [`ScoringSession`]: scores items under every category filter and
//!   computes macro and micro averages
//! - [`stats`]: bootstrap intervals and paired t-tests over per-item scores
//!
//! # Metrics Reference
//!
//! | Field | Description |
//! |-------|-------------|
//! | tp / fp / fn | Matched, unmatched candidate, unmatched reference propositions |
//! | pr / re / f | Precision, recall, F1 over plain counts |
//! | wtp / wfp / wfn | Counts weighted by document frequency |
//! | wpr / wre / wf | Precision, recall, F1 over weighted counts |

pub mod record;
pub mod session;
pub mod stats;

pub use record::{Counts, Evaluation, Ratios, WeightedCounts};
pub use session::{ImageId, ItemScore, ScoringSession};
pub use stats::{
    bootstrap_ci, cohens_d, interpret_cohens_d, paired_ttest, BootstrapResult, TTestResult,
};
