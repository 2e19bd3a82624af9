//! Learner capability and baseline learners.

pub mod domain;
pub mod models;

pub use domain::Learner;
pub use models::{MeanRegressor, NoChangeClassifier, PriorClassifier};
