use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid dataset {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Self-paced reading data: one entry per stimulus, one time per word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingTimesData {
    pub stimuli: Vec<Stimulus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stimulus {
    pub words: Vec<String>,
    pub reading_times: Vec<f64>,
}

/// Sentence-level recordings; `recordings[i]` is the response vector to `sentences[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
    pub sentences: Vec<String>,
    pub recordings: Vec<Vec<f64>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ReadingTimesData {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let data: Self = read_json(path)?;
        let invalid = |reason: String| DatasetError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        if data.stimuli.is_empty() {
            return Err(invalid("no stimuli".into()));
        }
        for (i, s) in data.stimuli.iter().enumerate() {
            if s.words.len() != s.reading_times.len() {
                return Err(invalid(format!(
                    "stimulus {}: {} words but {} reading times",
                    i,
                    s.words.len(),
                    s.reading_times.len()
                )));
            }
        }
        Ok(data)
    }
}

impl NeuralData {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let data: Self = read_json(path)?;
        let invalid = |reason: String| DatasetError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        if data.sentences.len() < 3 {
            return Err(invalid(format!(
                "need at least 3 sentences, got {}",
                data.sentences.len()
            )));
        }
        if data.sentences.len() != data.recordings.len() {
            return Err(invalid(format!(
                "{} sentences but {} recordings",
                data.sentences.len(),
                data.recordings.len()
            )));
        }
        let width = data.recordings[0].len();
        if width == 0 || data.recordings.iter().any(|r| r.len() != width) {
            return Err(invalid("recordings must be non-empty and equally sized".into()));
        }
        if let Some(c) = data.ceiling {
            if !(c > 0.0 && c <= 1.0) {
                return Err(invalid(format!("ceiling {} outside (0, 1]", c)));
            }
        }
        Ok(data)
    }
}
