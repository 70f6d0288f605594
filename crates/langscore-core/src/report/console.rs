use crate::engine::PairOutcome;
use crate::report::RunArtifacts;

pub fn print_summary(artifacts: &RunArtifacts, verbose: bool) {
    eprintln!(
        "\nSubmission #{}: {} pairs",
        artifacts.submission_id,
        artifacts.outcomes.len()
    );

    for o in &artifacts.outcomes {
        let pair = format!("{} / {}", o.model(), o.benchmark());
        match o {
            PairOutcome::Scored {
                score_ceiled,
                score_raw,
                error,
                ..
            } => {
                let err = error.map(|e| format!(" ±{:.4}", e)).unwrap_or_default();
                eprintln!(
                    "✅ {:<48} {:.4}{}  (raw {:.4})",
                    pair, score_ceiled, err, score_raw
                );
            }
            PairOutcome::Failed { diagnostic, .. } => {
                eprintln!("❌ {:<48} {}", pair, diagnostic.type_name);
                if verbose {
                    for line in diagnostic.to_string().lines() {
                        eprintln!("    {}", line);
                    }
                } else {
                    eprintln!("    {}", diagnostic.message);
                }
            }
            PairOutcome::NotFound { .. } => {
                eprintln!("⏭️  {:<48} benchmark not found", pair);
            }
        }
    }

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} scored, {} failed, {} benchmark not found",
        artifacts.scored(),
        artifacts.failed(),
        artifacts.not_found()
    );
}
