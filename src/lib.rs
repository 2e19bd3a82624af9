//! Prequential (test-then-train) evaluation of online learners.
pub mod common;
pub mod data;
pub mod evaluation;
pub mod training;

pub use common::{AppCfg, ErrorCode, EvalError, EvalResult};
pub use data::{Features, Sample, Schema};
pub use evaluation::{holdout, Accuracy, ConfusionMatrix, MacroF1, Mae, Metric, Prequential, Report};
pub use training::{Learner, MeanRegressor, NoChangeClassifier, PriorClassifier};
