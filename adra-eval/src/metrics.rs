//! Scoring primitives: set overlap for plans and citations, F1 for diagnostics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Set-overlap scores of a predicted set against a gold set.
///
/// True negatives are undefined for retrieval sets, so only coverage (recall) and
/// structural correctness (precision) are reported next to the IoU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JaccardScore {
    pub jaccard: f64,
    pub recall: f64,
    pub precision: f64,
}

impl JaccardScore {
    /// `jaccard`, `recall`, `precision`, in that order.
    pub fn to_metrics(&self) -> IndexMap<String, f64> {
        IndexMap::from([
            ("jaccard".to_string(), self.jaccard),
            ("recall".to_string(), self.recall),
            ("precision".to_string(), self.precision),
        ])
    }
}

/// Jaccard index, recall and precision of `predicted` against `gold`.
///
/// All three are zero when `gold` is empty. Precision is zero when `predicted` is empty.
pub fn calculate_jaccard<T: Eq + Hash>(predicted: &HashSet<T>, gold: &HashSet<T>) -> JaccardScore {
    if gold.is_empty() {
        return JaccardScore::default();
    }

    let intersection = predicted.intersection(gold).count() as f64;
    let union = predicted.union(gold).count() as f64;

    JaccardScore {
        jaccard: intersection / union,
        recall: intersection / gold.len() as f64,
        precision: if predicted.is_empty() {
            0.0
        } else {
            intersection / predicted.len() as f64
        },
    }
}

/// Confusion counts over the gold diagnostic questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Questions answered exactly as gold.
    pub correct: usize,
    /// Gold questions, answered or not.
    pub total: usize,
}

impl DiagnosticCounts {
    /// Tally `predicted` against every gold question.
    ///
    /// A gold question missing from `predicted` counts toward `total` and, when the gold
    /// answer is `true`, toward `false_negatives`. Predicted questions absent from gold
    /// are ignored.
    pub fn tally(predicted: &BTreeMap<String, bool>, gold: &BTreeMap<String, bool>) -> Self {
        let mut counts = Self::default();
        for (question, &expected) in gold {
            counts.total += 1;
            let Some(&answer) = predicted.get(question) else {
                if expected {
                    counts.false_negatives += 1;
                }
                continue;
            };

            if answer == expected {
                counts.correct += 1;
            }
            match (answer, expected) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_positives += 1,
                (false, true) => counts.false_negatives += 1,
                (false, false) => {}
            }
        }
        counts
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Diagnostic answer scores, with the counts they were computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningScore {
    pub accuracy: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
    pub counts: DiagnosticCounts,
}

impl ReasoningScore {
    /// `accuracy`, `f1`, `precision`, `recall`, in that order.
    pub fn to_metrics(&self) -> IndexMap<String, f64> {
        IndexMap::from([
            ("accuracy".to_string(), self.accuracy),
            ("f1".to_string(), self.f1),
            ("precision".to_string(), self.precision),
            ("recall".to_string(), self.recall),
        ])
    }
}

/// Accuracy, precision, recall and F1 of boolean diagnostic answers.
///
/// Every score is zero when `gold` is empty.
pub fn calculate_reasoning_f1(
    predicted: &BTreeMap<String, bool>,
    gold: &BTreeMap<String, bool>,
) -> ReasoningScore {
    if gold.is_empty() {
        return ReasoningScore::default();
    }

    let counts = DiagnosticCounts::tally(predicted, gold);
    ReasoningScore {
        accuracy: counts.accuracy(),
        f1: counts.f1(),
        precision: counts.precision(),
        recall: counts.recall(),
        counts,
    }
}
