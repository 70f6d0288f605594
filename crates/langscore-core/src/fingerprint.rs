use sha2::{Digest, Sha256};

use crate::model::JobArgs;

#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub hex: String,
    pub components: Vec<String>,
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Deterministic fingerprint of what a scoring job asks for.
///
/// Model and benchmark lists are sorted so that argument order does not
/// change the fingerprint; the job id is deliberately excluded so reruns of
/// the same request can be matched.
pub fn compute(args: &JobArgs) -> Fingerprint {
    let mut models = args.new_models.clone();
    models.sort();
    let mut benchmarks = args.new_benchmarks.clone();
    benchmarks.sort();

    let parts = vec![
        format!("user_id={}", args.user_id),
        format!("model_type={}", args.model_type.as_str()),
        format!("public={}", args.public),
        format!("competition={}", args.competition.as_deref().unwrap_or("")),
        format!("models={}", models.join(",")),
        format!("benchmarks={}", benchmarks.join(",")),
        format!("specified_only={}", args.specified_only),
        format!("langscore_version={}", env!("CARGO_PKG_VERSION")),
    ];

    let hex = sha256_hex(&parts.join("\n"));
    Fingerprint {
        hex,
        components: parts,
    }
}
