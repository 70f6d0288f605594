//! The interface benchmarks use to talk to a model under evaluation.
//!
//! Benchmarks never see a model's internals: they start a behavioral task
//! or a neural recording, then hand the subject text parts to digest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CapabilityError, SubjectError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralTask {
    /// Surprisal (bits) of each part given the parts before it.
    ReadingTimes,
}

impl fmt::Display for BehavioralTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehavioralTask::ReadingTimes => f.write_str("behavioral task reading_times"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingTarget {
    LanguageSystem,
}

impl fmt::Display for RecordingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingTarget::LanguageSystem => f.write_str("neural recording language_system"),
        }
    }
}

/// Output of one `digest_text` call, one entry per text part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neural: Option<Vec<Vec<f64>>>,
}

pub trait Subject: Send {
    fn identifier(&self) -> &str;

    fn start_behavioral_task(&mut self, task: BehavioralTask) -> Result<(), CapabilityError>;

    fn start_neural_recording(&mut self, target: RecordingTarget) -> Result<(), CapabilityError>;

    /// Presents `parts` in order as one continuous text.
    fn digest_text(&mut self, parts: &[String]) -> Result<Digest, SubjectError>;
}

/// Lowercased word tokens with surrounding punctuation stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}
