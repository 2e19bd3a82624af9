//! Streaming evaluation: metric accumulators and the evaluation loops.

pub mod domain;
pub mod service;

pub use domain::{Accuracy, ConfusionMatrix, MacroF1, Mae, Metric, Report};
pub use service::{holdout, Prequential};
