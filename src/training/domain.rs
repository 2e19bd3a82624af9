//! The learner capability driven by the evaluators.

use crate::common::error::EvalResult;
use crate::data::domain::Features;

/// Incrementally trainable predictor.
///
/// `predict` borrows the model immutably, so a prediction can only depend on
/// what earlier `learn` calls accumulated. `Ok(None)` means the model has no
/// basis for a prediction yet.
pub trait Learner<L> {
    fn predict(&self, x: &Features) -> EvalResult<Option<L>>;
    fn learn(&mut self, x: &Features, y: &L) -> EvalResult<()>;

    /// Short identifier for reports and logs.
    fn name(&self) -> &str;
}

impl<L, T: Learner<L> + ?Sized> Learner<L> for Box<T> {
    fn predict(&self, x: &Features) -> EvalResult<Option<L>> {
        (**self).predict(x)
    }

    fn learn(&mut self, x: &Features, y: &L) -> EvalResult<()> {
        (**self).learn(x, y)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
