//! Runtime configuration loaded from the environment.
//!
//! Command line flags take precedence; see `main.rs`.

use std::env;

use super::error::{EvalError, EvalResult};

pub const ENV_PROGRESS_EVERY: &str = "PREQ_PROGRESS_EVERY";
pub const ENV_LOG: &str = "PREQ_LOG";
pub const ENV_LOG_JSON: &str = "PREQ_LOG_JSON";

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, PartialEq)]
pub struct AppCfg {
    /// Emit a progress event every N samples. `None` disables it.
    pub progress_every: Option<u64>,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
    /// Emit JSON lines instead of the human readable format.
    pub log_json: bool,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            progress_every: None,
            log_filter: "info".to_string(),
            log_json: true,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> EvalResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> EvalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let progress_every = match lookup(ENV_PROGRESS_EVERY) {
            Some(raw) => parse_every(ENV_PROGRESS_EVERY, &raw)?,
            None => defaults.progress_every,
        };

        let log_json = match lookup(ENV_LOG_JSON).as_deref().map(str::trim) {
            None => defaults.log_json,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(EvalError::config(
                    ENV_LOG_JSON,
                    format!("expected a boolean, got `{other}`"),
                ))
            }
        };

        Ok(Self {
            progress_every,
            log_filter: lookup(ENV_LOG).unwrap_or(defaults.log_filter),
            log_json,
        })
    }
}

/// `0` disables progress reporting.
fn parse_every(key: &str, raw: &str) -> EvalResult<Option<u64>> {
    let n: u64 = raw
        .trim()
        .parse()
        .map_err(|_| EvalError::config(key, format!("expected an integer, got `{raw}`")))?;
    Ok((n > 0).then_some(n))
}
