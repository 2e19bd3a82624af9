//! Logging setup and the shared event shape.
//!
//! Events carry the `module`/`ev`/`code`/`dur_ms` fields so JSON lines from
//! different modules can be filtered the same way.

use tracing_subscriber::EnvFilter;

use super::config::AppCfg;
use super::error::{EvalError, EvalResult};

/// Install the global subscriber. Logs go to stderr so stdout stays free for reports.
pub fn init(cfg: &AppCfg) -> EvalResult<()> {
    let filter = EnvFilter::try_new(&cfg.log_filter)
        .map_err(|err| EvalError::config("log_filter", err.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if cfg.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| EvalError::config("log", err.to_string()))
}

/// Emit a completion event for a module level operation.
pub fn log_outcome(module: &str, event: &str, code: u32, dur_ms: u128) {
    if code == 0 {
        tracing::info!(module, ev = event, code, dur_ms = dur_ms as u64);
    } else {
        tracing::error!(module, ev = event, code, dur_ms = dur_ms as u64);
    }
}
