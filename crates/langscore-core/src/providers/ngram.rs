use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::errors::{CapabilityError, SubjectError};
use crate::subject::{tokenize, BehavioralTask, Digest, RecordingTarget, Subject};

const BOS: &str = "<s>";
pub const DEFAULT_SMOOTHING: f64 = 0.1;

/// Add-k smoothed bigram language model.
///
/// Surprisal is reported in bits. Context carries across the parts of one
/// `digest_text` call and resets between calls.
pub struct BigramSubject {
    identifier: String,
    smoothing: f64,
    unigrams: HashMap<String, u64>,
    bigrams: HashMap<(String, String), u64>,
    task: Option<BehavioralTask>,
}

impl BigramSubject {
    pub fn train(identifier: impl Into<String>, corpus: &str, smoothing: f64) -> Self {
        let mut unigrams: HashMap<String, u64> = HashMap::new();
        let mut bigrams: HashMap<(String, String), u64> = HashMap::new();
        for line in corpus.lines() {
            let mut prev = BOS.to_string();
            *unigrams.entry(prev.clone()).or_insert(0) += 1;
            for w in tokenize(line) {
                *unigrams.entry(w.clone()).or_insert(0) += 1;
                *bigrams.entry((prev, w.clone())).or_insert(0) += 1;
                prev = w;
            }
        }
        Self {
            identifier: identifier.into(),
            smoothing,
            unigrams,
            bigrams,
            task: None,
        }
    }

    pub fn from_corpus_file(
        identifier: impl Into<String>,
        path: &Path,
        smoothing: f64,
    ) -> anyhow::Result<Self> {
        let corpus = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus {}", path.display()))?;
        Ok(Self::train(identifier, &corpus, smoothing))
    }

    /// Vocabulary size including one slot for unseen words.
    fn vocab_size(&self) -> f64 {
        self.unigrams.len() as f64 + 1.0
    }

    /// P(word | prev) with add-k smoothing.
    pub fn probability(&self, prev: &str, word: &str) -> f64 {
        let pair = self
            .bigrams
            .get(&(prev.to_string(), word.to_string()))
            .copied()
            .unwrap_or(0) as f64;
        let ctx = self.unigrams.get(prev).copied().unwrap_or(0) as f64;
        (pair + self.smoothing) / (ctx + self.smoothing * self.vocab_size())
    }
}

impl Subject for BigramSubject {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn start_behavioral_task(&mut self, task: BehavioralTask) -> Result<(), CapabilityError> {
        self.task = Some(task);
        Ok(())
    }

    fn start_neural_recording(&mut self, target: RecordingTarget) -> Result<(), CapabilityError> {
        Err(CapabilityError::not_implemented(&self.identifier, target))
    }

    fn digest_text(&mut self, parts: &[String]) -> Result<Digest, SubjectError> {
        if self.task.is_none() {
            return Err(SubjectError::NotStarted(self.identifier.clone()));
        }

        let mut prev = BOS.to_string();
        let mut surprisals = Vec::with_capacity(parts.len());
        for part in parts {
            let mut bits = 0.0;
            for w in tokenize(part) {
                bits -= self.probability(&prev, &w).log2();
                prev = w;
            }
            surprisals.push(bits);
        }

        Ok(Digest {
            behavior: Some(surprisals),
            ..Digest::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "the dog runs\nthe dogs run\nthe dog sleeps\n";

    #[test]
    fn probabilities_follow_add_k_counts() {
        let lm = BigramSubject::train("bigram-test", CORPUS, 1.0);
        // vocab: <s> the dog runs dogs run sleeps = 7, +1 unseen
        // count(the)=3, count(the, dog)=2
        let p = lm.probability("the", "dog");
        assert!((p - 3.0 / 11.0).abs() < 1e-12);
        let unseen = lm.probability("the", "cat");
        assert!((unseen - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn surprisal_is_contextual_across_parts() {
        let mut lm = BigramSubject::train("bigram-test", CORPUS, 1.0);
        lm.start_behavioral_task(BehavioralTask::ReadingTimes).unwrap();
        let d = lm
            .digest_text(&["the dog".into(), "runs".into(), "".into()])
            .unwrap();
        let s = d.behavior.unwrap();
        assert_eq!(s.len(), 3);
        let expected_runs = -lm.probability("dog", "runs").log2();
        assert!((s[1] - expected_runs).abs() < 1e-12);
        assert_eq!(s[2], 0.0);
    }

    #[test]
    fn neural_recording_is_not_implemented() {
        let mut lm = BigramSubject::train("bigram-test", CORPUS, 1.0);
        let err = lm
            .start_neural_recording(RecordingTarget::LanguageSystem)
            .unwrap_err();
        assert!(err.location().file().ends_with("ngram.rs"));
    }
}
