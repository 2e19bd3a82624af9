//! prequential CLI - replay a JSON-lines stream through an online learner.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use prequential::common::{log, AppCfg};
use prequential::data::service::open_jsonl;
use prequential::{
    holdout, Accuracy, Learner, MacroF1, Mae, MeanRegressor, Metric, NoChangeClassifier,
    Prequential, PriorClassifier, Report, Schema,
};

#[derive(Parser)]
#[command(name = "prequential")]
#[command(about = "Test-then-train evaluation of online learners", long_about = None)]
struct Cli {
    /// Log filter directive (overrides PREQ_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    /// Human readable logs instead of JSON lines
    #[arg(long, global = true)]
    plain_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interleaved test-then-train over the whole stream
    Run {
        #[command(flatten)]
        opts: StreamOpts,

        /// Log progress every N samples (overrides PREQ_PROGRESS_EVERY, 0 disables)
        #[arg(long)]
        every: Option<u64>,
    },
    /// Learn a prefix, then score the remainder without learning
    Holdout {
        #[command(flatten)]
        opts: StreamOpts,

        /// Number of leading samples used for training only
        #[arg(long)]
        train_size: u64,
    },
}

#[derive(Args)]
struct StreamOpts {
    /// JSON-lines file, one {"x": {...}, "y": ...} object per line
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value = "classification")]
    task: Task,

    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    #[arg(long, value_enum)]
    metric: Option<MetricKind>,

    /// Features every sample must carry
    #[arg(long, value_delimiter = ',')]
    require: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Task {
    Classification,
    Regression,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModelKind {
    Prior,
    NoChange,
    Mean,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MetricKind {
    Accuracy,
    MacroF1,
    Mae,
}

/// Evaluation mode shared by both label types.
enum Mode {
    Prequential { every: Option<u64> },
    Holdout { train_size: u64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppCfg::load().context("reading configuration from environment")?;
    if let Some(filter) = cli.log {
        cfg.log_filter = filter;
    }
    if cli.plain_logs {
        cfg.log_json = false;
    }
    log::init(&cfg).context("installing log subscriber")?;

    let (opts, mode) = match cli.command {
        Commands::Run { opts, every } => {
            let every = every.or(cfg.progress_every);
            (opts, Mode::Prequential { every })
        }
        Commands::Holdout { opts, train_size } => (opts, Mode::Holdout { train_size }),
    };

    info!(input = %opts.input.display(), task = ?opts.task, "starting evaluation");
    let schema = Schema::new(opts.require.clone());

    let report = match opts.task {
        Task::Classification => {
            let (model, metric) = classification_parts(opts.model, opts.metric)?;
            evaluate(&opts.input, schema, model, metric, mode)?
        }
        Task::Regression => {
            let (model, metric) = regression_parts(opts.model, opts.metric)?;
            evaluate(&opts.input, schema, model, metric, mode)?
        }
    };

    info!(%report, "evaluation finished");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

type Parts<L> = (Box<dyn Learner<L>>, Box<dyn Metric<L>>);

/// Learner and metric for string class labels. Defaults to prior + accuracy.
fn classification_parts(
    model: Option<ModelKind>,
    metric: Option<MetricKind>,
) -> Result<Parts<String>> {
    let model: Box<dyn Learner<String>> = match model.unwrap_or(ModelKind::Prior) {
        ModelKind::Prior => Box::new(PriorClassifier::<String>::new()),
        ModelKind::NoChange => Box::new(NoChangeClassifier::<String>::new()),
        ModelKind::Mean => bail!("model `mean` only supports --task regression"),
    };
    let metric: Box<dyn Metric<String>> = match metric.unwrap_or(MetricKind::Accuracy) {
        MetricKind::Accuracy => Box::new(Accuracy::<String>::new()),
        MetricKind::MacroF1 => Box::new(MacroF1::<String>::new()),
        MetricKind::Mae => bail!("metric `mae` only supports --task regression"),
    };
    Ok((model, metric))
}

/// Learner and metric for numeric targets. Defaults to mean + mae.
fn regression_parts(
    model: Option<ModelKind>,
    metric: Option<MetricKind>,
) -> Result<Parts<f64>> {
    let model: Box<dyn Learner<f64>> = match model.unwrap_or(ModelKind::Mean) {
        ModelKind::Mean => Box::new(MeanRegressor::new()),
        ModelKind::NoChange => Box::new(NoChangeClassifier::<f64>::new()),
        ModelKind::Prior => bail!("model `prior` only supports --task classification"),
    };
    let metric: Box<dyn Metric<f64>> = match metric.unwrap_or(MetricKind::Mae) {
        MetricKind::Mae => Box::new(Mae::new()),
        MetricKind::Accuracy => bail!("metric `accuracy` only supports --task classification"),
        MetricKind::MacroF1 => bail!("metric `macro-f1` only supports --task classification"),
    };
    Ok((model, metric))
}

fn evaluate<L>(
    input: &Path,
    schema: Schema,
    mut model: Box<dyn Learner<L>>,
    mut metric: Box<dyn Metric<L>>,
    mode: Mode,
) -> Result<Report>
where
    L: serde::de::DeserializeOwned + 'static,
{
    let stream = schema.checked(
        open_jsonl::<L>(input).with_context(|| format!("opening {}", input.display()))?,
    );

    let report = match mode {
        Mode::Prequential { every } => Prequential::new(model, metric)
            .with_progress_every(every)
            .try_run(stream),
        Mode::Holdout { train_size } => holdout(&mut model, &mut metric, train_size, stream),
    };
    report.with_context(|| format!("evaluating {}", input.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<L>(parts: &Parts<L>) -> (&str, &str) {
        (parts.0.name(), parts.1.name())
    }

    #[test]
    fn defaults_per_task() {
        let parts = classification_parts(None, None).unwrap();
        assert_eq!(names(&parts), ("prior", "accuracy"));
        let parts = regression_parts(None, None).unwrap();
        assert_eq!(names(&parts), ("mean", "mae"));
    }

    #[test]
    fn explicit_choices_are_honoured() {
        let parts =
            classification_parts(Some(ModelKind::NoChange), Some(MetricKind::MacroF1)).unwrap();
        assert_eq!(names(&parts), ("no-change", "macro-f1"));
        let parts = regression_parts(Some(ModelKind::NoChange), None).unwrap();
        assert_eq!(names(&parts), ("no-change", "mae"));
    }

    #[test]
    fn rejects_mismatched_task_choices() {
        let err = classification_parts(Some(ModelKind::Mean), None).err().unwrap();
        assert!(err.to_string().contains("mean"));
        assert!(classification_parts(None, Some(MetricKind::Mae)).is_err());
        assert!(regression_parts(Some(ModelKind::Prior), None).is_err());
        let err = regression_parts(None, Some(MetricKind::Accuracy)).err().unwrap();
        assert!(err.to_string().contains("accuracy"));
        assert!(regression_parts(None, Some(MetricKind::MacroF1)).is_err());
    }

    #[test]
    fn cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "prequential",
            "run",
            "--input",
            "stream.jsonl",
            "--task",
            "regression",
            "--require",
            "a,b",
            "--every",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { opts, every } => {
                assert_eq!(opts.task, Task::Regression);
                assert_eq!(opts.require, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(every, Some(10));
            }
            Commands::Holdout { .. } => panic!("expected run"),
        }
    }
}
