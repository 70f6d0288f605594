use std::path::Path;

use async_trait::async_trait;

use super::formula::{self, Expr};
use super::suite::Suite;
use super::RegionTotals;
use crate::benchmark::Benchmark;
use crate::errors::BenchmarkError;
use crate::model::{Score, SubScores, SUB_BENCHMARK_DIM};
use crate::subject::{BehavioralTask, Subject};

/// Accuracy of a subject on one test suite.
///
/// `suite` is public so callers can restrict evaluation to a prefix of the
/// items (e.g. to compare against a partial reference).
pub struct SyntaxGymSingleTse {
    identifier: String,
    pub suite: Suite,
    predictions: Vec<Expr>,
}

impl SyntaxGymSingleTse {
    pub fn new(suite: Suite) -> Result<Self, BenchmarkError> {
        let predictions = suite
            .predictions
            .iter()
            .map(|p| formula::parse(&p.formula))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            identifier: format!("syntaxgym-{}", suite.name()),
            suite,
            predictions,
        })
    }

    pub fn from_dir(suite_dir: &Path, name: &str) -> anyhow::Result<Self> {
        let suite = Suite::load_named(suite_dir, name)?;
        Ok(Self::new(suite)?)
    }

    /// Per item, in suite order: surprisal of every region of every condition.
    pub fn get_region_totals(
        &self,
        subject: &mut dyn Subject,
    ) -> Result<Vec<RegionTotals>, BenchmarkError> {
        subject.start_behavioral_task(BehavioralTask::ReadingTimes)?;

        let mut out = Vec::with_capacity(self.suite.items.len());
        for item in &self.suite.items {
            let mut totals = RegionTotals::new();
            for cond in &item.conditions {
                let parts: Vec<String> = cond.regions.iter().map(|r| r.content.clone()).collect();
                let digest = subject.digest_text(&parts)?;
                let surprisals = digest
                    .behavior
                    .ok_or(BenchmarkError::MissingOutput { what: "behavior" })?;
                if surprisals.len() != parts.len() {
                    return Err(BenchmarkError::Data(format!(
                        "item {} condition '{}': {} regions but {} surprisals",
                        item.item_number,
                        cond.condition_name,
                        parts.len(),
                        surprisals.len()
                    )));
                }
                for (region, s) in cond.regions.iter().zip(surprisals) {
                    if !s.is_finite() {
                        return Err(BenchmarkError::Data(format!(
                            "item {} condition '{}' region {}: surprisal is {}",
                            item.item_number, cond.condition_name, region.region_number, s
                        )));
                    }
                    *totals
                        .entry((cond.condition_name.clone(), region.region_number))
                        .or_insert(0.0) += s;
                }
            }
            out.push(totals);
        }
        Ok(out)
    }

    /// Whether each item satisfies every prediction of the suite.
    pub fn item_results(&self, subject: &mut dyn Subject) -> Result<Vec<bool>, BenchmarkError> {
        let totals = self.get_region_totals(subject)?;
        totals
            .iter()
            .map(|t| -> Result<bool, BenchmarkError> {
                for p in &self.predictions {
                    if !p.holds(t)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
            .collect()
    }
}

#[async_trait]
impl Benchmark for SyntaxGymSingleTse {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn score(&self, subject: &mut dyn Subject) -> Result<Score, BenchmarkError> {
        if self.suite.items.is_empty() {
            return Err(BenchmarkError::EmptySuite(self.suite.name().to_string()));
        }
        let results = self.item_results(subject)?;
        let correct = results.iter().filter(|ok| **ok).count();
        let accuracy = correct as f64 / results.len() as f64;
        tracing::debug!(
            event = "langscore.syntaxgym.suite_scored",
            suite = %self.suite.name(),
            subject = %subject.identifier(),
            correct,
            items = results.len(),
        );
        let mut score = Score::new(accuracy);
        score.raw = Some(accuracy);
        Ok(score)
    }
}

/// Mean accuracy over several suites, keeping one sub-score per suite.
pub struct SyntaxGymTse {
    identifier: String,
    labels: Vec<String>,
    pub sub_benchmarks: Vec<SyntaxGymSingleTse>,
}

impl SyntaxGymTse {
    /// Sub-scores are labelled by suite name, in the order given.
    pub fn from_suites(
        identifier: impl Into<String>,
        suites: Vec<Suite>,
    ) -> Result<Self, BenchmarkError> {
        if suites.is_empty() {
            return Err(BenchmarkError::EmptyComposite);
        }
        let labels = suites.iter().map(|s| s.name().to_string()).collect();
        let sub_benchmarks = suites
            .into_iter()
            .map(SyntaxGymSingleTse::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            identifier: identifier.into(),
            labels,
            sub_benchmarks,
        })
    }

    /// Loads `<suite_dir>/<name>.json` for every name; labels are the names as requested.
    pub fn from_dir(
        identifier: impl Into<String>,
        suite_dir: &Path,
        names: &[String],
    ) -> anyhow::Result<Self> {
        if names.is_empty() {
            return Err(BenchmarkError::EmptyComposite.into());
        }
        let sub_benchmarks = names
            .iter()
            .map(|n| SyntaxGymSingleTse::from_dir(suite_dir, n))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            identifier: identifier.into(),
            labels: names.to_vec(),
            sub_benchmarks,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[async_trait]
impl Benchmark for SyntaxGymTse {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn score(&self, subject: &mut dyn Subject) -> Result<Score, BenchmarkError> {
        let mut sub = SubScores::new(SUB_BENCHMARK_DIM);
        for (label, bench) in self.labels.iter().zip(&self.sub_benchmarks) {
            let s = bench.score(subject).await?;
            sub.push(label.clone(), s.item());
        }
        let mean = sub.mean().ok_or(BenchmarkError::EmptyComposite)?;
        let err = standard_error(&sub.values());
        let mut score = Score::new(mean).with_error(err).with_sub_scores(sub);
        score.raw = Some(mean);
        Ok(score)
    }
}

fn standard_error(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((var / n).sqrt())
}
