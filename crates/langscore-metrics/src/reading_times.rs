use std::path::Path;

use async_trait::async_trait;
use langscore_core::benchmark::Benchmark;
use langscore_core::errors::BenchmarkError;
use langscore_core::model::Score;
use langscore_core::subject::{BehavioralTask, Subject};

use crate::data::{DatasetError, ReadingTimesData};
use crate::stats::pearsonr;

/// Correlation between per-word surprisal and human reading times.
pub struct ReadingTimesBenchmark {
    identifier: String,
    data: ReadingTimesData,
    ceiling: Option<f64>,
}

impl ReadingTimesBenchmark {
    pub fn new(identifier: impl Into<String>, data: ReadingTimesData, ceiling: Option<f64>) -> Self {
        Self {
            identifier: identifier.into(),
            data,
            ceiling,
        }
    }

    pub fn load(
        identifier: impl Into<String>,
        path: &Path,
        ceiling: Option<f64>,
    ) -> Result<Self, DatasetError> {
        Ok(Self::new(identifier, ReadingTimesData::load(path)?, ceiling))
    }
}

#[async_trait]
impl Benchmark for ReadingTimesBenchmark {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn ceiling(&self) -> Option<f64> {
        self.ceiling
    }

    async fn score(&self, subject: &mut dyn Subject) -> Result<Score, BenchmarkError> {
        subject.start_behavioral_task(BehavioralTask::ReadingTimes)?;

        let mut surprisal = Vec::new();
        let mut times = Vec::new();
        for (i, stimulus) in self.data.stimuli.iter().enumerate() {
            let digest = subject.digest_text(&stimulus.words)?;
            let behavior = digest
                .behavior
                .ok_or(BenchmarkError::MissingOutput { what: "behavior" })?;
            if behavior.len() != stimulus.words.len() {
                return Err(BenchmarkError::Data(format!(
                    "stimulus {}: {} words but {} surprisals",
                    i,
                    stimulus.words.len(),
                    behavior.len()
                )));
            }
            surprisal.extend(behavior);
            times.extend_from_slice(&stimulus.reading_times);
        }

        let raw = pearsonr(&surprisal, &times).ok_or_else(|| {
            BenchmarkError::Data(format!(
                "{}: correlation undefined over {} words",
                self.identifier,
                times.len()
            ))
        })?;
        tracing::debug!(
            event = "langscore.reading_times.scored",
            benchmark = %self.identifier,
            words = times.len(),
            raw,
        );

        Ok(match self.ceiling {
            Some(c) => Score::ceiled(raw, c),
            None => {
                let mut s = Score::new(raw);
                s.raw = Some(raw);
                s
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Stimulus;
    use langscore_core::providers::{BigramSubject, RandomEmbeddingSubject};

    const CORPUS: &str = "the dog runs\nthe dog runs\nthe dog sleeps\nthe cat sleeps\n";

    fn data() -> ReadingTimesData {
        // reading times track surprisal: frequent continuations are read faster
        let stim = |w: &[&str], t: &[f64]| Stimulus {
            words: w.iter().map(|s| s.to_string()).collect(),
            reading_times: t.to_vec(),
        };
        ReadingTimesData {
            stimuli: vec![
                stim(&["the", "dog", "runs"], &[250.0, 300.0, 310.0]),
                stim(&["the", "cat", "sleeps"], &[250.0, 420.0, 330.0]),
                stim(&["the", "dog", "barks"], &[250.0, 300.0, 520.0]),
            ],
        }
    }

    #[tokio::test]
    async fn surprisal_correlates_with_reading_times() {
        let bench = ReadingTimesBenchmark::new("rt-test", data(), Some(0.5));
        let mut lm = BigramSubject::train("bigram", CORPUS, 0.1);
        let score = bench.score(&mut lm).await.unwrap();
        let raw = score.raw.unwrap();
        assert!(raw > 0.5, "raw = {}", raw);
        assert!((score.value - (raw / 0.5).min(1.0)).abs() < 1e-12);
        assert_eq!(score.ceiling, Some(0.5));
    }

    #[tokio::test]
    async fn embedding_subject_cannot_read() {
        let bench = ReadingTimesBenchmark::new("rt-test", data(), None);
        let mut subject = RandomEmbeddingSubject::new(16);
        let err = bench.score(&mut subject).await.unwrap_err();
        assert_eq!(err.type_name(), "NotImplementedError");
    }
}
