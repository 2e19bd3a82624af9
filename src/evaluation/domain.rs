//! Metric accumulators and evaluation reports.
//!
//! Accumulators keep running statistics only. Their memory depends on the
//! number of distinct classes, never on the number of samples.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::common::error::{EvalError, EvalResult};

/// Running performance statistic fed with `(truth, prediction)` pairs.
pub trait Metric<L> {
    fn update(&mut self, y_true: &L, y_pred: &L) -> EvalResult<()>;

    /// Current score, `None` until the first update.
    fn value(&self) -> Option<f64>;

    /// Number of updates received.
    fn count(&self) -> u64;

    fn name(&self) -> &str;
}

impl<L, T: Metric<L> + ?Sized> Metric<L> for Box<T> {
    fn update(&mut self, y_true: &L, y_pred: &L) -> EvalResult<()> {
        (**self).update(y_true, y_pred)
    }

    fn value(&self) -> Option<f64> {
        (**self).value()
    }

    fn count(&self) -> u64 {
        (**self).count()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Counts of `(truth, prediction)` pairs.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix<L> {
    cells: HashMap<(L, L), u64>,
    actual: HashMap<L, u64>,
    predicted: HashMap<L, u64>,
    total: u64,
    correct: u64,
}

impl<L> Default for ConfusionMatrix<L> {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
            actual: HashMap::new(),
            predicted: HashMap::new(),
            total: 0,
            correct: 0,
        }
    }
}

impl<L: Eq + Hash + Clone> ConfusionMatrix<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, y_true: &L, y_pred: &L) {
        *self
            .cells
            .entry((y_true.clone(), y_pred.clone()))
            .or_insert(0) += 1;
        *self.actual.entry(y_true.clone()).or_insert(0) += 1;
        *self.predicted.entry(y_pred.clone()).or_insert(0) += 1;
        self.total += 1;
        if y_true == y_pred {
            self.correct += 1;
        }
    }

    /// Count for a single cell.
    pub fn get(&self, y_true: &L, y_pred: &L) -> u64 {
        self.cells
            .get(&(y_true.clone(), y_pred.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Non-zero cells as `(truth, prediction, count)`, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = (&L, &L, u64)> {
        self.cells.iter().map(|((t, p), n)| (t, p, *n))
    }

    /// Classes observed either as truth or as prediction.
    pub fn classes(&self) -> impl Iterator<Item = &L> {
        self.actual.keys().chain(
            self.predicted
                .keys()
                .filter(move |class| !self.actual.contains_key(*class)),
        )
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn correct(&self) -> u64 {
        self.correct
    }

    pub fn true_positives(&self, class: &L) -> u64 {
        self.get(class, class)
    }

    pub fn false_positives(&self, class: &L) -> u64 {
        self.predicted.get(class).copied().unwrap_or(0) - self.true_positives(class)
    }

    pub fn false_negatives(&self, class: &L) -> u64 {
        self.actual.get(class).copied().unwrap_or(0) - self.true_positives(class)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Fraction of correct predictions.
#[derive(Clone, Debug)]
pub struct Accuracy<L> {
    cm: ConfusionMatrix<L>,
}

impl<L> Default for Accuracy<L> {
    fn default() -> Self {
        Self {
            cm: ConfusionMatrix::default(),
        }
    }
}

impl<L: Eq + Hash + Clone> Accuracy<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confusion_counts(&self) -> &ConfusionMatrix<L> {
        &self.cm
    }
}

impl<L: Eq + Hash + Clone> Metric<L> for Accuracy<L> {
    fn update(&mut self, y_true: &L, y_pred: &L) -> EvalResult<()> {
        self.cm.record(y_true, y_pred);
        Ok(())
    }

    fn value(&self) -> Option<f64> {
        (self.cm.total() > 0).then(|| self.cm.correct() as f64 / self.cm.total() as f64)
    }

    fn count(&self) -> u64 {
        self.cm.total()
    }

    fn name(&self) -> &str {
        "accuracy"
    }
}

/// Unweighted mean of per-class F1 scores.
#[derive(Clone, Debug)]
pub struct MacroF1<L> {
    cm: ConfusionMatrix<L>,
}

impl<L> Default for MacroF1<L> {
    fn default() -> Self {
        Self {
            cm: ConfusionMatrix::default(),
        }
    }
}

impl<L: Eq + Hash + Clone> MacroF1<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confusion_counts(&self) -> &ConfusionMatrix<L> {
        &self.cm
    }
}

impl<L: Eq + Hash + Clone> Metric<L> for MacroF1<L> {
    fn update(&mut self, y_true: &L, y_pred: &L) -> EvalResult<()> {
        self.cm.record(y_true, y_pred);
        Ok(())
    }

    fn value(&self) -> Option<f64> {
        if self.cm.total() == 0 {
            return None;
        }
        let (sum, n) = self.cm.classes().fold((0.0, 0u64), |(sum, n), class| {
            let tp = self.cm.true_positives(class) as f64;
            let fp = self.cm.false_positives(class) as f64;
            let fn_ = self.cm.false_negatives(class) as f64;
            (sum + 2.0 * tp / (2.0 * tp + fp + fn_), n + 1)
        });
        Some(sum / n as f64)
    }

    fn count(&self) -> u64 {
        self.cm.total()
    }

    fn name(&self) -> &str {
        "macro-f1"
    }
}

/// Mean absolute error for numeric targets.
#[derive(Clone, Debug, Default)]
pub struct Mae {
    n: u64,
    mean: f64,
}

impl Mae {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric<f64> for Mae {
    fn update(&mut self, y_true: &f64, y_pred: &f64) -> EvalResult<()> {
        let err = (y_true - y_pred).abs();
        if !err.is_finite() {
            return Err(EvalError::metric(format!(
                "non-finite error for truth {y_true} and prediction {y_pred}"
            )));
        }
        self.n += 1;
        self.mean += (err - self.mean) / self.n as f64;
        Ok(())
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    fn count(&self) -> u64 {
        self.n
    }

    fn name(&self) -> &str {
        "mae"
    }
}

/// Snapshot of an evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub model: String,
    pub metric: String,
    /// `None` when no sample has been scored.
    pub value: Option<f64>,
    /// Samples predicted (and scored when possible), including one whose learn step faulted.
    pub seen: u64,
    /// Samples that reached the metric.
    pub scored: u64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{} {}: {value:.6}", self.model, self.metric)?,
            None => write!(f, "{} {}: n/a", self.model, self.metric)?,
        }
        write!(f, " ({} scored / {} seen)", self.scored, self.seen)
    }
}
