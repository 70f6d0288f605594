pub mod console;

use crate::engine::PairOutcome;

#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub submission_id: i64,
    pub fingerprint: String,
    pub outcomes: Vec<PairOutcome>,
}

impl RunArtifacts {
    pub fn scored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Scored { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Failed { .. }))
            .count()
    }

    pub fn not_found(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::NotFound { .. }))
            .count()
    }
}
