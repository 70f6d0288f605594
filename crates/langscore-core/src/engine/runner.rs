use std::collections::HashSet;

use crate::benchmark::BenchmarkRegistry;
use crate::errors::{Diagnostic, RegistryError};
use crate::fingerprint;
use crate::model::{JobArgs, ScoreEntry, SubmissionStatus};
use crate::on_error::{ErrorPolicy, ErrorPolicyResult};
use crate::providers::ModelRegistry;
use crate::report::RunArtifacts;
use crate::storage::store::{now_rfc3339, Store};

/// Result of scoring one (model, benchmark) pair.
#[derive(Debug, Clone)]
pub enum PairOutcome {
    Scored {
        model: String,
        benchmark: String,
        score_ceiled: f64,
        score_raw: f64,
        /// Standard error of the score, reported but not stored.
        error: Option<f64>,
    },
    /// A row was stored with null scores and the diagnostic as comment.
    Failed {
        model: String,
        benchmark: String,
        diagnostic: Diagnostic,
    },
    /// Benchmark identifier is not registered; nothing was stored.
    NotFound { model: String, benchmark: String },
}

impl PairOutcome {
    pub fn model(&self) -> &str {
        match self {
            PairOutcome::Scored { model, .. }
            | PairOutcome::Failed { model, .. }
            | PairOutcome::NotFound { model, .. } => model,
        }
    }

    pub fn benchmark(&self) -> &str {
        match self {
            PairOutcome::Scored { benchmark, .. }
            | PairOutcome::Failed { benchmark, .. }
            | PairOutcome::NotFound { benchmark, .. } => benchmark,
        }
    }

    pub fn stored_row(&self) -> bool {
        !matches!(self, PairOutcome::NotFound { .. })
    }
}

pub struct ScoringRunner {
    pub store: Store,
    pub benchmarks: BenchmarkRegistry,
    pub models: ModelRegistry,
    pub policy: ErrorPolicy,
}

impl ScoringRunner {
    pub fn new(store: Store, benchmarks: BenchmarkRegistry, models: ModelRegistry) -> Self {
        Self {
            store,
            benchmarks,
            models,
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run_scoring(&self, args: &JobArgs) -> anyhow::Result<RunArtifacts> {
        if !self.store.user_exists(args.user_id)? {
            anyhow::bail!("user {} does not exist", args.user_id);
        }

        let fp = fingerprint::compute(args);
        let stored_models = self.store.list_model_names()?;
        let submission_id = self.store.create_submission(args, &fp.hex)?;
        tracing::info!(
            event = "langscore.run_start",
            submission_id,
            job_id = args.job_id,
            models = args.new_models.len(),
            benchmarks = args.new_benchmarks.len(),
            specified_only = args.specified_only,
            fingerprint = %fp.hex,
        );

        for model in &args.new_models {
            if let Err(e) = self.store.upsert_model(
                model,
                args.user_id,
                submission_id,
                args.public,
                args.competition.as_deref(),
            ) {
                return Err(self.fail_submission(
                    submission_id,
                    e.context(format!("storing model {}", model)),
                ));
            }
        }

        let pairs = self.pairs(args, &stored_models);
        let mut outcomes = Vec::with_capacity(pairs.len());
        for (model, benchmark) in pairs {
            match self.score_pair(&model, &benchmark).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    return Err(self.fail_submission(
                        submission_id,
                        e.context(format!("scoring {} on {}", model, benchmark)),
                    ));
                }
            }
        }

        self.store
            .finalize_submission(submission_id, SubmissionStatus::Successful)?;
        tracing::info!(
            event = "langscore.run_finished",
            submission_id,
            status = SubmissionStatus::Successful.as_str(),
            pairs = outcomes.len(),
        );

        Ok(RunArtifacts {
            submission_id,
            fingerprint: fp.hex,
            outcomes,
        })
    }

    /// Marks the submission `failure` and returns `e` with the submission id attached.
    fn fail_submission(&self, submission_id: i64, e: anyhow::Error) -> anyhow::Error {
        if let Err(finalize) = self
            .store
            .finalize_submission(submission_id, SubmissionStatus::Failure)
        {
            tracing::error!(
                event = "langscore.finalize_failed",
                submission_id,
                error = %finalize,
            );
        }
        tracing::error!(
            event = "langscore.run_finished",
            submission_id,
            status = SubmissionStatus::Failure.as_str(),
            error = %e,
        );
        e.context(format!("aborted submission {}", submission_id))
    }

    /// Expands a job into the ordered list of pairs to score.
    ///
    /// With `specified_only` this is the cross product of the new models and
    /// benchmarks. Otherwise the new models also run on every registered
    /// benchmark, and previously stored models run on the new benchmarks.
    pub fn pairs(&self, args: &JobArgs, stored_models: &[String]) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for m in &args.new_models {
            for b in &args.new_benchmarks {
                pairs.push((m.clone(), b.clone()));
            }
        }

        if !args.specified_only {
            for m in &args.new_models {
                for b in self.benchmarks.identifiers() {
                    pairs.push((m.clone(), b.to_string()));
                }
            }
            for m in stored_models.iter().filter(|m| !args.new_models.contains(m)) {
                for b in &args.new_benchmarks {
                    pairs.push((m.clone(), b.clone()));
                }
            }
        }

        let mut seen = HashSet::new();
        pairs.retain(|p| seen.insert(p.clone()));
        pairs
    }

    async fn score_pair(&self, model: &str, benchmark_id: &str) -> anyhow::Result<PairOutcome> {
        let benchmark = match self.benchmarks.load(benchmark_id) {
            Ok(b) => b,
            Err(RegistryError::NotFound(_)) => {
                tracing::warn!(
                    event = "langscore.benchmark_not_found",
                    model,
                    benchmark = benchmark_id,
                );
                return Ok(PairOutcome::NotFound {
                    model: model.to_string(),
                    benchmark: benchmark_id.to_string(),
                });
            }
            Err(e) => {
                if self.policy.aborts_on_error() {
                    return Err(e.into());
                }
                let diagnostic = Diagnostic::from_registry(&e);
                return self.record_failure(model, benchmark_id, None, diagnostic, now_rfc3339());
            }
        };
        let ceiling = benchmark.ceiling();

        let start = now_rfc3339();
        let mut subject = match self.models.load(model) {
            Ok(s) => s,
            Err(e) => {
                let diagnostic = Diagnostic::unknown_model(model, &e);
                return self.record_failure(model, benchmark_id, ceiling, diagnostic, start);
            }
        };

        let result = benchmark.score(subject.as_mut()).await;
        match result {
            Ok(score) => {
                let entry = ScoreEntry {
                    model: model.to_string(),
                    benchmark: benchmark_id.to_string(),
                    score_ceiled: Some(score.value),
                    score_raw: Some(score.raw_value()),
                    error: None,
                    comment: None,
                    start_timestamp: start,
                    end_timestamp: now_rfc3339(),
                };
                self.insert(&entry, ceiling)?;
                tracing::info!(
                    event = "langscore.pair_scored",
                    model,
                    benchmark = benchmark_id,
                    score_ceiled = score.value,
                    score_raw = score.raw_value(),
                );
                Ok(PairOutcome::Scored {
                    model: model.to_string(),
                    benchmark: benchmark_id.to_string(),
                    score_ceiled: score.value,
                    score_raw: score.raw_value(),
                    error: score.error,
                })
            }
            Err(e) => match self.policy.apply_to_error(&e) {
                ErrorPolicyResult::Recorded(diagnostic) => {
                    self.record_failure(model, benchmark_id, ceiling, diagnostic, start)
                }
                ErrorPolicyResult::Aborted { reason } => Err(anyhow::anyhow!(reason)),
            },
        }
    }

    fn record_failure(
        &self,
        model: &str,
        benchmark_id: &str,
        ceiling: Option<f64>,
        diagnostic: Diagnostic,
        start: String,
    ) -> anyhow::Result<PairOutcome> {
        let entry = ScoreEntry {
            model: model.to_string(),
            benchmark: benchmark_id.to_string(),
            score_ceiled: None,
            score_raw: None,
            error: None,
            comment: Some(diagnostic.to_string()),
            start_timestamp: start,
            end_timestamp: now_rfc3339(),
        };
        self.insert(&entry, ceiling)?;
        tracing::warn!(
            event = "langscore.pair_failed",
            model,
            benchmark = benchmark_id,
            error_type = %diagnostic.type_name,
            message = %diagnostic.message,
        );
        Ok(PairOutcome::Failed {
            model: model.to_string(),
            benchmark: benchmark_id.to_string(),
            diagnostic,
        })
    }

    fn insert(&self, entry: &ScoreEntry, ceiling: Option<f64>) -> anyhow::Result<()> {
        let model_id = match self.store.model_id(&entry.model)? {
            Some(id) => id,
            None => anyhow::bail!("model '{}' has no stored row", entry.model),
        };
        let benchmark_id = self.store.upsert_benchmark(&entry.benchmark, ceiling)?;
        self.store.insert_score(model_id, benchmark_id, entry)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelType;

    fn runner() -> ScoringRunner {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let mut benchmarks = BenchmarkRegistry::new();
        for id in ["b1", "b2"] {
            benchmarks.register(id, || Err(anyhow::anyhow!("not loaded in these tests")));
        }
        ScoringRunner::new(store, benchmarks, ModelRegistry::new())
    }

    fn args(models: &[&str], benchmarks: &[&str], specified_only: bool) -> JobArgs {
        JobArgs {
            job_id: 1,
            user_id: 1,
            model_type: ModelType::ArtificialSubject,
            public: true,
            competition: None,
            new_models: models.iter().map(|s| s.to_string()).collect(),
            new_benchmarks: benchmarks.iter().map(|s| s.to_string()).collect(),
            specified_only,
        }
    }

    fn pair(m: &str, b: &str) -> (String, String) {
        (m.to_string(), b.to_string())
    }

    #[test]
    fn specified_only_is_the_cross_product() {
        let r = runner();
        let got = r.pairs(&args(&["m1", "m2"], &["b1", "x"], true), &["old".into()]);
        assert_eq!(
            got,
            vec![pair("m1", "b1"), pair("m1", "x"), pair("m2", "b1"), pair("m2", "x")]
        );
    }

    #[test]
    fn full_expansion_adds_registered_and_historical_pairs() {
        let r = runner();
        let stored = vec!["old".to_string(), "m1".to_string()];
        let got = r.pairs(&args(&["m1"], &["b2"], false), &stored);
        assert_eq!(got, vec![pair("m1", "b2"), pair("m1", "b1"), pair("old", "b2")]);
    }
}
