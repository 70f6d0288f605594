use sha2::{Digest as _, Sha256};
use std::collections::HashMap;

use crate::errors::{CapabilityError, SubjectError};
use crate::subject::{tokenize, BehavioralTask, Digest, RecordingTarget, Subject};

pub const IDENTIFIER_PREFIX: &str = "randomembedding-";

/// Deterministic random word embeddings; a text part is the mean of its words.
///
/// Word vectors are derived from SHA-256 of `(word, chunk)`, so coordinate
/// `i` of a word is identical across dimensionalities. The subject has no
/// notion of sequence and therefore only supports neural recording.
pub struct RandomEmbeddingSubject {
    identifier: String,
    dims: usize,
    recording: bool,
    vectors: HashMap<String, Vec<f64>>,
}

impl RandomEmbeddingSubject {
    pub fn new(dims: usize) -> Self {
        Self {
            identifier: format!("{}{}", IDENTIFIER_PREFIX, dims),
            dims,
            recording: false,
            vectors: HashMap::new(),
        }
    }

    /// Parses `randomembedding-<dims>`.
    pub fn from_identifier(id: &str) -> Option<Self> {
        let dims: usize = id.strip_prefix(IDENTIFIER_PREFIX)?.parse().ok()?;
        if dims == 0 {
            return None;
        }
        Some(Self::new(dims))
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn word_vector(&mut self, word: &str) -> &[f64] {
        let dims = self.dims;
        self.vectors
            .entry(word.to_string())
            .or_insert_with(|| word_vector(word, dims))
    }

    fn embed(&mut self, text: &str) -> Vec<f64> {
        let words = tokenize(text);
        let mut acc = vec![0.0; self.dims];
        if words.is_empty() {
            return acc;
        }
        for w in &words {
            let v = self.word_vector(w);
            for (a, x) in acc.iter_mut().zip(v) {
                *a += x;
            }
        }
        let n = words.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        acc
    }
}

fn word_vector(word: &str, dims: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(dims);
    let mut chunk: u64 = 0;
    while out.len() < dims {
        let mut h = Sha256::new();
        h.update(word.as_bytes());
        h.update(chunk.to_le_bytes());
        let bytes = h.finalize();
        for pair in bytes.chunks_exact(2) {
            if out.len() == dims {
                break;
            }
            let raw = u16::from_le_bytes([pair[0], pair[1]]) as f64;
            out.push(raw / u16::MAX as f64 * 2.0 - 1.0);
        }
        chunk += 1;
    }
    out
}

impl Subject for RandomEmbeddingSubject {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn start_behavioral_task(&mut self, task: BehavioralTask) -> Result<(), CapabilityError> {
        Err(CapabilityError::not_implemented(&self.identifier, task))
    }

    fn start_neural_recording(&mut self, _target: RecordingTarget) -> Result<(), CapabilityError> {
        self.recording = true;
        Ok(())
    }

    fn digest_text(&mut self, parts: &[String]) -> Result<Digest, SubjectError> {
        if !self.recording {
            return Err(SubjectError::NotStarted(self.identifier.clone()));
        }
        let neural = parts.iter().map(|p| self.embed(p)).collect();
        Ok(Digest {
            neural: Some(neural),
            ..Digest::default()
        })
    }
}
