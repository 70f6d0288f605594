use std::path::Path;

use async_trait::async_trait;
use langscore_core::benchmark::Benchmark;
use langscore_core::errors::BenchmarkError;
use langscore_core::model::Score;
use langscore_core::subject::{RecordingTarget, Subject};

use crate::data::{DatasetError, NeuralData};
use crate::stats::{pearsonr, rdm_upper};

/// Representational similarity between model activations and recordings.
///
/// Both sides are turned into correlation-distance RDMs over the stimulus
/// sentences; the raw score is the Pearson r of their upper triangles.
pub struct NeuralRdmBenchmark {
    identifier: String,
    data: NeuralData,
    recording_rdm: Vec<f64>,
    ceiling: Option<f64>,
}

impl NeuralRdmBenchmark {
    /// A configured `ceiling` overrides the one shipped with the data.
    pub fn new(identifier: impl Into<String>, data: NeuralData, ceiling: Option<f64>) -> Self {
        let recording_rdm = rdm_upper(&data.recordings);
        let ceiling = ceiling.or(data.ceiling);
        Self {
            identifier: identifier.into(),
            data,
            recording_rdm,
            ceiling,
        }
    }

    pub fn load(
        identifier: impl Into<String>,
        path: &Path,
        ceiling: Option<f64>,
    ) -> Result<Self, DatasetError> {
        Ok(Self::new(identifier, NeuralData::load(path)?, ceiling))
    }
}

#[async_trait]
impl Benchmark for NeuralRdmBenchmark {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn ceiling(&self) -> Option<f64> {
        self.ceiling
    }

    async fn score(&self, subject: &mut dyn Subject) -> Result<Score, BenchmarkError> {
        subject.start_neural_recording(RecordingTarget::LanguageSystem)?;
        let digest = subject.digest_text(&self.data.sentences)?;
        let activations = digest
            .neural
            .ok_or(BenchmarkError::MissingOutput { what: "neural" })?;
        if activations.len() != self.data.sentences.len() {
            return Err(BenchmarkError::Data(format!(
                "{} sentences but {} activation vectors",
                self.data.sentences.len(),
                activations.len()
            )));
        }

        let model_rdm = rdm_upper(&activations);
        let raw = pearsonr(&model_rdm, &self.recording_rdm).ok_or_else(|| {
            BenchmarkError::Data(format!("{}: RDM correlation undefined", self.identifier))
        })?;
        tracing::debug!(
            event = "langscore.neural.scored",
            benchmark = %self.identifier,
            sentences = self.data.sentences.len(),
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
