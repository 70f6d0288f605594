use anyhow::Context;
use langscore_core::config::load_config;
use langscore_core::engine::ScoringRunner;
use langscore_core::model::{JobArgs, ModelType};
use langscore_core::on_error::ErrorPolicy;
use langscore_core::providers::ModelRegistry;
use langscore_core::report::console::print_summary;

use super::{exit_codes, open_store};
use crate::cli::args::{OnError, ScoreArgs};

pub async fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, args.strict) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let job = match job_args(&args) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("invalid job arguments: {:#}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let policy = match args.on_error {
        Some(OnError::Abort) => ErrorPolicy::Abort,
        Some(OnError::Record) => ErrorPolicy::Record,
        None => cfg.error_policy,
    };

    let store = open_store(&args.db)?;
    let runner = ScoringRunner::new(
        store,
        langscore_metrics::benchmark_registry(&cfg),
        ModelRegistry::from_specs(&cfg.models),
    )
    .with_policy(policy);

    match runner.run_scoring(&job).await {
        Ok(artifacts) => {
            print_summary(&artifacts, args.verbose);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("scoring failed: {:#}", e);
            Ok(exit_codes::RUN_FAILED)
        }
    }
}

fn job_args(args: &ScoreArgs) -> anyhow::Result<JobArgs> {
    if let Some(path) = &args.args_json {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return JobArgs::from_json(&raw).with_context(|| format!("invalid {}", path.display()));
    }

    let model_type: ModelType =
        serde_json::from_value(serde_json::Value::String(args.model_type.clone()))
            .with_context(|| format!("unknown model type '{}'", args.model_type))?;
    let competition = args
        .competition
        .clone()
        .filter(|c| !c.is_empty() && c != "None");

    Ok(JobArgs {
        job_id: args.job_id.context("--job-id is required")?,
        user_id: args.user_id,
        model_type,
        public: args.public,
        competition,
        new_models: args.models.clone(),
        new_benchmarks: args.benchmarks.clone(),
        specified_only: args.specified_only,
    })
}
