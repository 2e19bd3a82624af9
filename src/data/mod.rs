//! Data domain: sample representation and streaming sources.

pub mod domain;
pub mod service;

pub use domain::{Features, Sample, Schema};
