//! Property-based tests for the prequential evaluator.
//!
//! These tests verify the ordering, exclusion and restart invariants.

use prequential::{
    Accuracy, EvalResult, Features, Learner, Metric, NoChangeClassifier, Prequential,
    PriorClassifier, Sample,
};
use proptest::prelude::*;

/// Learner whose prediction encodes everything it has learned so far.
///
/// Predicts `None` until trained, then the number of learned samples plus
/// the sum of their labels. Any leak of the current label into its own
/// prediction changes the value.
#[derive(Default)]
struct History {
    n: u64,
    label_sum: u64,
}

impl Learner<u64> for History {
    fn predict(&self, _x: &Features) -> EvalResult<Option<u64>> {
        Ok((self.n > 0).then_some(self.n * 1_000 + self.label_sum))
    }

    fn learn(&mut self, _x: &Features, y: &u64) -> EvalResult<()> {
        self.n += 1;
        self.label_sum += y;
        Ok(())
    }

    fn name(&self) -> &str {
        "history"
    }
}

/// Strategy for a single sample with one feature and a small label space
fn sample() -> impl Strategy<Value = Sample<u64>> {
    (-100.0..100.0f64, 0..4u64).prop_map(|(a, y)| Sample::from_pairs([("a", a)], y))
}

fn stream(max: usize) -> impl Strategy<Value = Vec<Sample<u64>>> {
    prop::collection::vec(sample(), 0..max)
}

proptest! {
    /// Property: the prediction for sample i only reflects samples 0..i
    #[test]
    fn prediction_ignores_current_and_later_samples(samples in stream(64)) {
        let mut eval = Prequential::new(History::default(), Accuracy::new());
        let mut probe = History::default();

        for sample in &samples {
            let expected = probe.predict(&sample.x).unwrap();
            let got = eval.step(sample.clone()).unwrap();
            prop_assert_eq!(got, expected);
            probe.learn(&sample.x, &sample.y).unwrap();
        }
    }

    /// Property: the metric sees exactly the samples that got a prediction
    #[test]
    fn only_present_predictions_are_scored(samples in stream(64)) {
        let mut eval = Prequential::new(PriorClassifier::new(), Accuracy::new());
        let mut present = 0u64;
        for sample in samples.iter().cloned() {
            if eval.step(sample).unwrap().is_some() {
                present += 1;
            }
        }

        let report = eval.report();
        prop_assert_eq!(report.scored, present);
        prop_assert_eq!(eval.metric().count(), present);
        prop_assert!(report.scored <= report.seen);
        prop_assert_eq!(report.seen, samples.len() as u64);
        // a prior model only abstains before its first training sample
        prop_assert_eq!(report.scored, (samples.len() as u64).saturating_sub(1));
    }

    /// Property: fresh model and metric replaying the same stream agree
    #[test]
    fn restart_is_reproducible(samples in stream(64)) {
        let first = Prequential::new(NoChangeClassifier::new(), Accuracy::new())
            .run(samples.clone())
            .unwrap();
        let second = Prequential::new(NoChangeClassifier::new(), Accuracy::new())
            .run(samples)
            .unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: accumulator state is bounded by the label space
    #[test]
    fn accumulator_size_is_independent_of_length(samples in stream(512)) {
        let mut eval = Prequential::new(NoChangeClassifier::new(), Accuracy::new());
        eval.run(samples).unwrap();
        let cm = eval.metric().confusion_counts();
        prop_assert!(cm.len() <= 16);
        prop_assert!(cm.classes().count() <= 4);
    }
}
