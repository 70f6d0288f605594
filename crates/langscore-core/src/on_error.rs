// on_error.rs - handling of benchmark failures other than missing capabilities
//
// Capability failures are always recorded as diagnostic rows. This policy
// decides what happens to every other benchmark error during a scoring run.

use serde::{Deserialize, Serialize};

use crate::errors::{BenchmarkError, Diagnostic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the run and mark the submission as failed (default).
    #[default]
    Abort,

    /// Store the failure as a diagnostic row and continue with the next pair.
    Record,
}

/// What the runner should do with one failed pair.
#[derive(Debug, Clone)]
pub enum ErrorPolicyResult {
    Recorded(Diagnostic),
    Aborted { reason: String },
}

impl ErrorPolicy {
    pub fn aborts_on_error(&self) -> bool {
        matches!(self, ErrorPolicy::Abort)
    }

    pub fn apply_to_error(&self, error: &BenchmarkError) -> ErrorPolicyResult {
        if let BenchmarkError::Capability(_) = error {
            return ErrorPolicyResult::Recorded(Diagnostic::from_benchmark(error));
        }
        match self {
            ErrorPolicy::Abort => ErrorPolicyResult::Aborted {
                reason: format!("{}: {}", error.type_name(), error),
            },
            ErrorPolicy::Record => ErrorPolicyResult::Recorded(Diagnostic::from_benchmark(error)),
        }
    }
}

impl ErrorPolicyResult {
    pub fn is_recorded(&self) -> bool {
        matches!(self, ErrorPolicyResult::Recorded(_))
    }
}
