//! Scoring configuration constants.
//!
//! Values shared by the scoring session, the standard category filters and
//! the evaluation binary. Keeping them here means reports, filters and tests
//! all agree on the same names and vocabularies.
//!
//! # Usage
//!
//! ```
//! use spice_core::config::{ALL_CATEGORY, COLOR_WORDS};
//!
//! assert_eq!(ALL_CATEGORY, "All");
//! assert!(COLOR_WORDS.contains(&"red"));
//! ```

// =============================================================================
// Aggregation
// =============================================================================

/// Category name of the unfiltered record produced for every item.
///
/// Reserved: a category filter cannot be registered under this name.
pub const ALL_CATEGORY: &str = "All";

/// Beta of the F-measure. SPICE uses the balanced F1.
pub const F_BETA: f64 = 1.0;

/// Decimal places used for ratio fields in the text report.
pub const REPORT_PRECISION: usize = 3;

/// Default number of bootstrap resamples for confidence intervals.
pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1000;

/// Default bootstrap seed, so repeated reports agree.
pub const DEFAULT_BOOTSTRAP_SEED: u64 = 42;

// =============================================================================
// Standard Category Vocabularies
// =============================================================================

/// Attribute words counted by the `Color` category.
pub const COLOR_WORDS: &[&str] = &[
    "beige", "black", "blond", "blonde", "blue", "brown", "brunette", "colorful", "cream",
    "dark", "golden", "gray", "green", "grey", "khaki", "maroon", "multicolored", "navy",
    "orange", "pink", "purple", "red", "silver", "tan", "teal", "turquoise", "violet", "white",
    "yellow",
];

/// Attribute words counted by the `Count` category.
pub const COUNT_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "dozen", "couple", "pair", "few", "several", "many", "multiple", "numerous",
    "single", "lone", "both",
];

/// Attribute words counted by the `Size` category.
pub const SIZE_WORDS: &[&str] = &[
    "big", "enormous", "giant", "gigantic", "huge", "large", "little", "long", "massive",
    "mini", "miniature", "short", "small", "tall", "tiny", "wide", "narrow", "thick", "thin",
];
