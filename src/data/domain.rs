//! Core sample definitions and the optional feature schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::error::{EvalError, EvalResult};

/// Named numeric features of a single observation.
pub type Features = BTreeMap<String, f64>;

/// One labelled observation. `L` is a class identifier or a numeric target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample<L> {
    pub x: Features,
    pub y: L,
}

impl<L> Sample<L> {
    pub fn new(x: Features, y: L) -> Self {
        Self { x, y }
    }

    /// Build a sample from `(name, value)` pairs.
    pub fn from_pairs<'a, I>(pairs: I, y: L) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let x = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Self { x, y }
    }
}

/// Feature names every sample must carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    required: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Reject samples with missing required features or non-finite values.
    /// Nothing is imputed.
    pub fn validate<L>(&self, sample: &Sample<L>) -> EvalResult<()> {
        for name in &self.required {
            if !sample.x.contains_key(name) {
                return Err(EvalError::MissingFeature { name: name.clone() });
            }
        }
        for (name, value) in &sample.x {
            if !value.is_finite() {
                return Err(EvalError::NonFiniteFeature {
                    name: name.clone(),
                    value: *value,
                });
            }
        }
        Ok(())
    }

    /// Validate every item of a fallible stream as it passes through.
    pub fn checked<L, I>(self, stream: I) -> impl Iterator<Item = EvalResult<Sample<L>>>
    where
        I: IntoIterator<Item = EvalResult<Sample<L>>>,
    {
        stream.into_iter().map(move |item| {
            let sample = item?;
            self.validate(&sample)?;
            Ok(sample)
        })
    }
}
