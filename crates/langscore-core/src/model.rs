use serde::{Deserialize, Deserializer, Serialize};

/// Dimension name used for composite sub-scores.
pub const SUB_BENCHMARK_DIM: &str = "sub_benchmark";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Ceiled value when the benchmark has a ceiling, raw value otherwise.
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_scores: Option<SubScores>,
}

impl Score {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            raw: None,
            ceiling: None,
            error: None,
            sub_scores: None,
        }
    }

    /// Normalises `raw` by `ceiling`, capped at 1.
    pub fn ceiled(raw: f64, ceiling: f64) -> Self {
        let value = if ceiling > 0.0 {
            (raw / ceiling).min(1.0)
        } else {
            raw
        };
        Self {
            value,
            raw: Some(raw),
            ceiling: Some(ceiling),
            error: None,
            sub_scores: None,
        }
    }

    pub fn with_error(mut self, error: Option<f64>) -> Self {
        self.error = error;
        self
    }

    pub fn with_sub_scores(mut self, sub: SubScores) -> Self {
        self.sub_scores = Some(sub);
        self
    }

    pub fn item(&self) -> f64 {
        self.value
    }

    pub fn raw_value(&self) -> f64 {
        self.raw.unwrap_or(self.value)
    }
}

impl From<&Score> for f64 {
    fn from(s: &Score) -> f64 {
        s.value
    }
}

/// Child scores along one labelled dimension, in the order they were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub dim: String,
    pub entries: Vec<(String, f64)>,
}

impl SubScores {
    pub fn new(dim: impl Into<String>) -> Self {
        Self {
            dim: dim.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.entries.push((label.into(), value));
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().map(|(_, v)| v).sum::<f64>() / self.entries.len() as f64)
    }
}

/// One persisted row per (model, benchmark) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub model: String,
    pub benchmark: String,
    pub score_ceiled: Option<f64>,
    pub score_raw: Option<f64>,
    pub error: Option<f64>,
    pub comment: Option<String>,
    pub start_timestamp: String,
    pub end_timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    #[serde(alias = "artificial_subject", alias = "ArtificialSubject")]
    ArtificialSubject,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::ArtificialSubject => "artificialsubject",
        }
    }
}

/// Arguments of one submission scoring job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArgs {
    #[serde(alias = "jenkins_id")]
    pub job_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub model_type: ModelType,
    #[serde(default)]
    pub public: bool,
    #[serde(default, deserialize_with = "competition_sentinel")]
    pub competition: Option<String>,
    #[serde(default)]
    pub new_models: Vec<String>,
    #[serde(default)]
    pub new_benchmarks: Vec<String>,
    #[serde(default)]
    pub specified_only: bool,
}

impl JobArgs {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Treats the literal string "None" (and the empty string) as no competition.
fn competition_sentinel<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|s| !s.is_empty() && s != "None"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Running,
    Successful,
    Failure,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Running => "running",
            SubmissionStatus::Successful => "successful",
            SubmissionStatus::Failure => "failure",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "running" => SubmissionStatus::Running,
            "successful" => SubmissionStatus::Successful,
            _ => SubmissionStatus::Failure,
        }
    }
}
