//! Evaluation loops driving a learner and a metric over a sample stream.
//!
//! `Prequential` implements test-then-train: every sample is predicted from
//! the state left by earlier samples, scored when a prediction exists, and
//! only then learned. `holdout` is the batch contrast: learn a prefix, score
//! the rest.

use std::marker::PhantomData;

use crate::common::error::EvalResult;
use crate::common::log;
use crate::common::time::Stopwatch;
use crate::data::domain::Sample;
use crate::training::domain::Learner;

use super::domain::{Metric, Report};

/// Interleaved test-then-train evaluator.
///
/// Owns the learner and the metric for the duration of a run. Counters
/// always describe exactly the samples whose processing completed, so the
/// evaluator can be inspected after the caller stops feeding it.
pub struct Prequential<L, M, A> {
    model: M,
    metric: A,
    seen: u64,
    scored: u64,
    progress_every: Option<u64>,
    _label: PhantomData<fn(L)>,
}

impl<L, M, A> Prequential<L, M, A>
where
    M: Learner<L>,
    A: Metric<L>,
{
    pub fn new(model: M, metric: A) -> Self {
        Self {
            model,
            metric,
            seen: 0,
            scored: 0,
            progress_every: None,
            _label: PhantomData,
        }
    }

    /// Log a progress event every `every` samples. `None` or `Some(0)` disables it.
    pub fn with_progress_every(mut self, every: Option<u64>) -> Self {
        self.progress_every = every.filter(|n| *n > 0);
        self
    }

    /// Process one sample and return the prediction made before learning it.
    pub fn step(&mut self, sample: Sample<L>) -> EvalResult<Option<L>> {
        let index = self.seen;
        let Sample { x, y } = sample;

        let prediction = self.model.predict(&x).map_err(|err| err.at_sample(index))?;
        if let Some(y_pred) = &prediction {
            self.metric
                .update(&y, y_pred)
                .map_err(|err| err.at_sample(index))?;
            self.scored += 1;
        }
        // seen once tested, so scored <= seen holds even if learn faults
        self.seen += 1;
        self.model.learn(&x, &y).map_err(|err| err.at_sample(index))?;

        if let Some(every) = self.progress_every {
            if self.seen % every == 0 {
                tracing::info!(
                    module = "evaluation",
                    ev = "progress",
                    seen = self.seen,
                    scored = self.scored,
                    value = self.metric.value(),
                    "{}",
                    self.metric.name()
                );
            }
        }

        Ok(prediction)
    }

    /// Consume an infallible stream and return the final report.
    pub fn run<I>(&mut self, stream: I) -> EvalResult<Report>
    where
        I: IntoIterator<Item = Sample<L>>,
    {
        self.try_run(stream.into_iter().map(Ok))
    }

    /// Consume a fallible stream. The first faulty item ends the run.
    pub fn try_run<I>(&mut self, stream: I) -> EvalResult<Report>
    where
        I: IntoIterator<Item = EvalResult<Sample<L>>>,
    {
        let clock = Stopwatch::start();
        let outcome = self.drain(stream);
        let code = outcome.as_ref().err().map_or(0, |err| err.code() as u32);
        log::log_outcome("evaluation", "prequential", code, clock.elapsed_ms());
        outcome.map(|()| self.report())
    }

    fn drain<I>(&mut self, stream: I) -> EvalResult<()>
    where
        I: IntoIterator<Item = EvalResult<Sample<L>>>,
    {
        for item in stream {
            let sample = item.map_err(|err| err.at_sample(self.seen))?;
            self.step(sample)?;
        }
        Ok(())
    }

    pub fn report(&self) -> Report {
        Report {
            model: self.model.name().to_string(),
            metric: self.metric.name().to_string(),
            value: self.metric.value(),
            seen: self.seen,
            scored: self.scored,
        }
    }

    pub fn progress_every(&self) -> Option<u64> {
        self.progress_every
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn scored(&self) -> u64 {
        self.scored
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn metric(&self) -> &A {
        &self.metric
    }

    pub fn into_parts(self) -> (M, A) {
        (self.model, self.metric)
    }
}

/// Learn the first `train_size` samples, then score every later sample
/// without learning from it.
pub fn holdout<L, M, A, I>(
    model: &mut M,
    metric: &mut A,
    train_size: u64,
    stream: I,
) -> EvalResult<Report>
where
    M: Learner<L>,
    A: Metric<L>,
    I: IntoIterator<Item = EvalResult<Sample<L>>>,
{
    let clock = Stopwatch::start();
    let mut seen = 0u64;
    let mut scored = 0u64;

    let outcome = (|| -> EvalResult<()> {
        for item in stream {
            let index = seen;
            let Sample { x, y } = item.map_err(|err| err.at_sample(index))?;
            if index < train_size {
                model.learn(&x, &y).map_err(|err| err.at_sample(index))?;
            } else if let Some(y_pred) = model.predict(&x).map_err(|err| err.at_sample(index))? {
                metric
                    .update(&y, &y_pred)
                    .map_err(|err| err.at_sample(index))?;
                scored += 1;
            }
            seen += 1;
        }
        Ok(())
    })();

    let code = outcome.as_ref().err().map_or(0, |err| err.code() as u32);
    log::log_outcome("evaluation", "holdout", code, clock.elapsed_ms());
    outcome?;

    if seen <= train_size {
        tracing::warn!(seen, train_size, "holdout stream ended before the test segment");
    }

    Ok(Report {
        model: model.name().to_string(),
        metric: metric.name().to_string(),
        value: metric.value(),
        seen,
        scored,
    })
}
