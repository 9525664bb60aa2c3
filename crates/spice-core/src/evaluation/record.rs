//! Evaluation records: precision, recall and F-score for one comparison.
//!
//! A record is derived from a [`MatchCount`] plus the sizes of the two tuple
//! sets. It keeps the raw counts (plain and weighted) and the ratios derived
//! from them.
//!
//! # Undefined scores
//!
//! When a category has no reference propositions for an item, its ratios
//! are not zero, they do not exist. Records built with `allow_nan` represent
//! that as `ratios: None`; aggregation skips such records when averaging
//! ratios but still sums their counts. In JSON the six ratio fields of an
//! undefined record are written as the string `"NaN"`.
//!
//! # Formula
//!
//! ```text
//! P  = tp / (tp + fp)          if tp + fp > 0, else 0
//! R  = tp / (tp + fn)          if tp + fn > 0, else 0
//! F1 = 2 * P * R / (P + R)     if P > 0 and R > 0, else 0
//! ```
//!
//! The weighted ratios use the same formulas over weighted counts.

use crate::config::{F_BETA, REPORT_PRECISION};
use crate::tuples::{Alignment, MatchCount, TupleSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{AddAssign, Div};

/// JSON representation of an undefined ratio.
const UNDEFINED: &str = "NaN";

/// Plain true positive / false positive / false negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub true_pos: usize,
    pub false_pos: usize,
    pub false_neg: usize,
}

/// Weighted counterparts of [`Counts`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedCounts {
    pub true_pos: f64,
    pub false_pos: f64,
    pub false_neg: f64,
}

/// The six derived ratio fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ratios {
    /// F-score
    pub f: f64,
    /// Precision
    pub pr: f64,
    /// Recall
    pub re: f64,
    /// Weighted F-score
    pub wf: f64,
    /// Weighted precision
    pub wpr: f64,
    /// Weighted recall
    pub wre: f64,
}

impl Ratios {
    /// Derives ratios from counts. Guarded divisions leave a field at 0.
    pub fn from_counts(counts: &Counts, weighted: &WeightedCounts) -> Self {
        let (pr, re, f) = precision_recall_f(
            counts.true_pos as f64,
            (counts.true_pos + counts.false_pos) as f64,
            (counts.true_pos + counts.false_neg) as f64,
        );
        let (wpr, wre, wf) = precision_recall_f(
            weighted.true_pos,
            weighted.true_pos + weighted.false_pos,
            weighted.true_pos + weighted.false_neg,
        );
        Self {
            f,
            pr,
            re,
            wf,
            wpr,
            wre,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.true_pos += other.true_pos;
        self.false_pos += other.false_pos;
        self.false_neg += other.false_neg;
    }
}

impl AddAssign for WeightedCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_pos += other.true_pos;
        self.false_pos += other.false_pos;
        self.false_neg += other.false_neg;
    }
}

impl AddAssign for Ratios {
    fn add_assign(&mut self, other: Self) {
        self.f += other.f;
        self.pr += other.pr;
        self.re += other.re;
        self.wf += other.wf;
        self.wpr += other.wpr;
        self.wre += other.wre;
    }
}

impl Div<f64> for Ratios {
    type Output = Ratios;

    fn div(self, n: f64) -> Ratios {
        Ratios {
            f: self.f / n,
            pr: self.pr / n,
            re: self.re / n,
            wf: self.wf / n,
            wpr: self.wpr / n,
            wre: self.wre / n,
        }
    }
}

fn precision_recall_f(tp: f64, test_n: f64, ref_n: f64) -> (f64, f64, f64) {
    let mut pr = 0.0;
    let mut re = 0.0;
    let mut f = 0.0;
    if ref_n > 0.0 {
        re = tp / ref_n;
        if test_n > 0.0 {
            pr = tp / test_n;
        }
        if pr > 0.0 && re > 0.0 {
            let beta2 = F_BETA * F_BETA;
            f = (1.0 + beta2) * (pr * re) / (beta2 * pr + re);
        }
    }
    (pr, re, f)
}

/// Scores for one (item, category) pair, or an aggregate over items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "EvaluationRecord", from = "EvaluationRecord")]
pub struct Evaluation {
    pub counts: Counts,
    pub weighted: WeightedCounts,
    /// `None` when the scores are undefined (no reference propositions).
    pub ratios: Option<Ratios>,
    /// Items that contributed; 1 for a per-item record.
    pub num_images: usize,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self {
            counts: Counts::default(),
            weighted: WeightedCounts::default(),
            ratios: Some(Ratios::default()),
            num_images: 0,
        }
    }
}

impl Evaluation {
    /// Derives a per-item record from set sizes and a match count.
    ///
    /// With `allow_nan`, an empty reference side yields undefined ratios
    /// regardless of the candidate side.
    pub fn derive(
        candidate_size: usize,
        reference_size: usize,
        weighted_candidate_size: f64,
        weighted_reference_size: f64,
        matched: MatchCount,
        allow_nan: bool,
    ) -> Self {
        let counts = Counts {
            true_pos: matched.n,
            false_pos: candidate_size.saturating_sub(matched.n),
            false_neg: reference_size.saturating_sub(matched.n),
        };
        let weighted = WeightedCounts {
            true_pos: matched.weighted_n,
            false_pos: weighted_candidate_size - matched.weighted_n,
            false_neg: weighted_reference_size - matched.weighted_n,
        };
        let mut record = Self {
            counts,
            weighted,
            ratios: None,
            num_images: 1,
        };
        record.recompute_ratios(allow_nan);
        record
    }

    /// Derives a record for two tuple sets already aligned by the matcher.
    pub fn from_alignment(
        candidate: &TupleSet,
        reference: &TupleSet,
        alignment: &Alignment,
        allow_nan: bool,
    ) -> Self {
        Self::derive(
            candidate.len(),
            reference.len(),
            candidate.weighted_len(),
            reference.weighted_len(),
            alignment.count,
            allow_nan,
        )
    }

    /// Replaces the ratios with ones derived purely from the counts.
    pub fn recompute_ratios(&mut self, allow_nan: bool) {
        let reference_n = self.counts.true_pos + self.counts.false_neg;
        self.ratios = if allow_nan && reference_n == 0 {
            None
        } else {
            Some(Ratios::from_counts(&self.counts, &self.weighted))
        };
    }

    pub fn is_undefined(&self) -> bool {
        self.ratios.is_none()
    }

    pub fn f(&self) -> Option<f64> {
        self.ratios.map(|r| r.f)
    }

    pub fn pr(&self) -> Option<f64> {
        self.ratios.map(|r| r.pr)
    }

    pub fn re(&self) -> Option<f64> {
        self.ratios.map(|r| r.re)
    }

    pub fn wf(&self) -> Option<f64> {
        self.ratios.map(|r| r.wf)
    }

    pub fn wpr(&self) -> Option<f64> {
        self.ratios.map(|r| r.wpr)
    }

    pub fn wre(&self) -> Option<f64> {
        self.ratios.map(|r| r.wre)
    }

    /// `f<delim>pr<delim>re`, undefined values as `NaN`.
    pub fn to_delimited(&self, delim: &str) -> String {
        [self.f(), self.pr(), self.re()]
            .iter()
            .map(|v| v.map_or_else(|| UNDEFINED.to_string(), |v| v.to_string()))
            .collect::<Vec<_>>()
            .join(delim)
    }
}

fn ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.*}", REPORT_PRECISION, v),
        None => UNDEFINED.to_string(),
    }
}

/// Multi-line report block, one field per line.
impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  f-score:\t{} (SPICE metric)", ratio(self.f()))?;
        writeln!(f, "  precision:\t{}", ratio(self.pr()))?;
        writeln!(f, "  recall:\t{}", ratio(self.re()))?;
        writeln!(f, "  true pos:\t{}", self.counts.true_pos)?;
        writeln!(f, "  false pos:\t{}", self.counts.false_pos)?;
        writeln!(f, "  false neg:\t{}", self.counts.false_neg)?;
        writeln!(f, "  weighted f-score:\t{}", ratio(self.wf()))?;
        writeln!(f, "  weighted precision:\t{}", ratio(self.wpr()))?;
        writeln!(f, "  weighted recall:\t{}", ratio(self.wre()))?;
        writeln!(f, "  weighted true pos:\t{:.0}", self.weighted.true_pos)?;
        writeln!(f, "  weighted false pos:\t{:.0}", self.weighted.false_pos)?;
        writeln!(f, "  weighted false neg:\t{:.0}", self.weighted.false_neg)?;
        writeln!(f, "  num images:\t{}", self.num_images)
    }
}

// ============================================================================
// Serialized Form
// ============================================================================

/// A ratio field on the wire: a number, or the `"NaN"` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Score {
    Value(f64),
    Undefined(String),
}

impl Score {
    fn value(self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(v),
            Score::Undefined(_) => None,
        }
    }
}

fn score(value: Option<f64>) -> Score {
    value.map_or_else(|| Score::Undefined(UNDEFINED.to_string()), Score::Value)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EvaluationRecord {
    tp: usize,
    fp: usize,
    #[serde(rename = "fn")]
    fn_: usize,
    f: Score,
    pr: Score,
    re: Score,
    wtp: f64,
    wfp: f64,
    wfn: f64,
    wf: Score,
    wpr: Score,
    wre: Score,
}

impl From<Evaluation> for EvaluationRecord {
    fn from(e: Evaluation) -> Self {
        Self {
            tp: e.counts.true_pos,
            fp: e.counts.false_pos,
            fn_: e.counts.false_neg,
            f: score(e.f()),
            pr: score(e.pr()),
            re: score(e.re()),
            wtp: e.weighted.true_pos,
            wfp: e.weighted.false_pos,
            wfn: e.weighted.false_neg,
            wf: score(e.wf()),
            wpr: score(e.wpr()),
            wre: score(e.wre()),
        }
    }
}

impl From<EvaluationRecord> for Evaluation {
    fn from(r: EvaluationRecord) -> Self {
        let ratios = (|| {
            Some(Ratios {
                f: r.f.value()?,
                pr: r.pr.value()?,
                re: r.re.value()?,
                wf: r.wf.value()?,
                wpr: r.wpr.value()?,
                wre: r.wre.value()?,
            })
        })();
        Self {
            counts: Counts {
                true_pos: r.tp,
                false_pos: r.fp,
                false_neg: r.fn_,
            },
            weighted: WeightedCounts {
                true_pos: r.wtp,
                false_pos: r.wfp,
                false_neg: r.wfn,
            },
            ratios,
            num_images: 1,
        }
    }
}
