//! Error handling primitives shared across the core.
//!
//! Every fault carries a stable numeric code so log lines and process
//! exit statuses stay comparable across releases.

use thiserror::Error;

/// Stable error codes emitted in log lines and used as exit statuses.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Sample could not be decoded or failed schema validation.
    MalformedSample = 1,
    /// The learner faulted while predicting or learning.
    Model = 2,
    /// The metric accumulator rejected an update.
    Metric = 3,
    /// Invalid configuration value.
    Config = 4,
    /// Reading the sample source failed.
    Io = 5,
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Input line could not be decoded into a sample.
    #[error("malformed sample on line {line}: {reason}")]
    MalformedSample { line: u64, reason: String },

    /// A feature required by the schema is missing.
    #[error("missing feature `{name}`")]
    MissingFeature { name: String },

    /// A feature value is NaN or infinite.
    #[error("feature `{name}` is not finite: {value}")]
    NonFiniteFeature { name: String, value: f64 },

    /// Fault raised by a learner.
    #[error("model fault: {0}")]
    Model(String),

    /// Fault raised by a metric accumulator.
    #[error("metric fault: {0}")]
    Metric(String),

    /// Invalid configuration.
    #[error("invalid config `{key}`: {reason}")]
    Config { key: String, reason: String },

    /// Underlying IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Fault attributed to a specific position in the stream (0-based).
    #[error("sample {index}: {source}")]
    AtSample {
        index: u64,
        #[source]
        source: Box<EvalError>,
    },
}

/// Result alias used throughout the crate.
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Decoding helper.
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            line,
            reason: reason.into(),
        }
    }

    /// Learner fault helper.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Metric fault helper.
    pub fn metric(msg: impl Into<String>) -> Self {
        Self::Metric(msg.into())
    }

    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Attach the stream position. Already positioned errors are left as they are.
    pub fn at_sample(self, index: u64) -> Self {
        match self {
            err @ Self::AtSample { .. } => err,
            other => Self::AtSample {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Machine parsable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedSample { .. }
            | Self::MissingFeature { .. }
            | Self::NonFiniteFeature { .. } => ErrorCode::MalformedSample,
            Self::Model(_) => ErrorCode::Model,
            Self::Metric(_) => ErrorCode::Metric,
            Self::Config { .. } => ErrorCode::Config,
            Self::Io(_) => ErrorCode::Io,
            Self::AtSample { source, .. } => source.code(),
        }
    }
}
