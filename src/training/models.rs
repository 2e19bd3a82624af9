//! Baseline learners.
//!
//! None of these look at the features. They give the evaluators something
//! deterministic to drive and act as the floor any real model must beat.

use std::collections::HashMap;
use std::hash::Hash;

use crate::common::error::{EvalError, EvalResult};
use crate::data::domain::Features;

use super::domain::Learner;

/// Predicts the most frequent class seen so far.
///
/// Ties keep whichever class reached the count first.
#[derive(Clone, Debug)]
pub struct PriorClassifier<L> {
    counts: HashMap<L, u64>,
    leader: Option<(L, u64)>,
}

impl<L> Default for PriorClassifier<L> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            leader: None,
        }
    }
}

impl<L: Eq + Hash + Clone> PriorClassifier<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of training samples seen for `class`.
    pub fn count(&self, class: &L) -> u64 {
        self.counts.get(class).copied().unwrap_or(0)
    }
}

impl<L: Eq + Hash + Clone> Learner<L> for PriorClassifier<L> {
    fn predict(&self, _x: &Features) -> EvalResult<Option<L>> {
        Ok(self.leader.as_ref().map(|(class, _)| class.clone()))
    }

    fn learn(&mut self, _x: &Features, y: &L) -> EvalResult<()> {
        let count = self.counts.entry(y.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        let overtakes = match &self.leader {
            Some((_, best)) => count > *best,
            None => true,
        };
        if overtakes {
            self.leader = Some((y.clone(), count));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "prior"
    }
}

/// Predicts the label of the previous sample.
#[derive(Clone, Debug)]
pub struct NoChangeClassifier<L> {
    last: Option<L>,
}

impl<L> Default for NoChangeClassifier<L> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<L: Clone> NoChangeClassifier<L> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Clone> Learner<L> for NoChangeClassifier<L> {
    fn predict(&self, _x: &Features) -> EvalResult<Option<L>> {
        Ok(self.last.clone())
    }

    fn learn(&mut self, _x: &Features, y: &L) -> EvalResult<()> {
        self.last = Some(y.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "no-change"
    }
}

/// Predicts the running mean of the targets seen so far.
#[derive(Clone, Debug, Default)]
pub struct MeanRegressor {
    n: u64,
    mean: f64,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Learner<f64> for MeanRegressor {
    fn predict(&self, _x: &Features) -> EvalResult<Option<f64>> {
        Ok((self.n > 0).then_some(self.mean))
    }

    fn learn(&mut self, _x: &Features, y: &f64) -> EvalResult<()> {
        if !y.is_finite() {
            return Err(EvalError::model(format!("target is not finite: {y}")));
        }
        let n = (self.n + 1) as f64;
        // divide before summing; targets near f64::MAX of opposite sign stay finite
        let mean = self.mean + y / n - self.mean / n;
        if !mean.is_finite() {
            return Err(EvalError::model(format!("running mean overflowed at target {y}")));
        }
        self.n += 1;
        self.mean = mean;
        Ok(())
    }

    fn name(&self) -> &str {
        "mean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Features {
        Features::new()
    }

    #[test]
    fn prior_is_absent_until_trained() {
        let mut model = PriorClassifier::<&str>::new();
        assert_eq!(model.predict(&x()).unwrap(), None);
        model.learn(&x(), &"a").unwrap();
        assert_eq!(model.predict(&x()).unwrap(), Some("a"));
    }

    #[test]
    fn prior_follows_majority_and_keeps_first_on_ties() {
        let mut model = PriorClassifier::new();
        for y in ["a", "b"] {
            model.learn(&x(), &y).unwrap();
        }
        assert_eq!(model.predict(&x()).unwrap(), Some("a"));
        model.learn(&x(), &"b").unwrap();
        assert_eq!(model.predict(&x()).unwrap(), Some("b"));
        assert_eq!(model.count(&"b"), 2);
        model.learn(&x(), &"b").unwrap();
        model.learn(&x(), &"a").unwrap();
        model.learn(&x(), &"a").unwrap();
        assert_eq!(model.predict(&x()).unwrap(), Some("b"));
    }

    #[test]
    fn no_change_repeats_last_label() {
        let mut model = NoChangeClassifier::new();
        assert_eq!(model.predict(&x()).unwrap(), None);
        model.learn(&x(), &1).unwrap();
        model.learn(&x(), &2).unwrap();
        assert_eq!(model.predict(&x()).unwrap(), Some(2));
    }

    #[test]
    fn mean_regressor_tracks_running_mean() {
        let mut model = MeanRegressor::new();
        assert_eq!(model.predict(&x()).unwrap(), None);
        for y in [1.0, 2.0, 6.0] {
            model.learn(&x(), &y).unwrap();
        }
        let mean = model.predict(&x()).unwrap().unwrap();
        assert!((mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_regressor_handles_extreme_opposite_targets() {
        let mut model = MeanRegressor::new();
        model.learn(&x(), &f64::MAX).unwrap();
        model.learn(&x(), &-f64::MAX).unwrap();
        let mean = model.predict(&x()).unwrap().unwrap();
        assert!(mean.is_finite());
        assert!(mean.abs() <= f64::MAX / 2.0);
    }

    #[test]
    fn mean_regressor_rejects_nan_target() {
        let mut model = MeanRegressor::new();
        assert!(matches!(
            model.learn(&x(), &f64::NAN),
            Err(EvalError::Model(_))
        ));
        assert_eq!(model.predict(&x()).unwrap(), None);
    }
}
