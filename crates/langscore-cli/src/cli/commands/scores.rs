use super::{exit_codes, open_store};
use crate::cli::args::{OutputFormat, ScoresArgs};

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.4}", x)).unwrap_or_else(|| "-".into())
}

pub fn run(args: ScoresArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    let rows = store.list_scores()?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            println!(
                "{:<28} {:<36} {:>8} {:>8} {:>8}  comment",
                "model", "benchmark", "ceiled", "raw", "error"
            );
            for r in &rows {
                let comment = r
                    .comment
                    .as_deref()
                    .and_then(|c| c.lines().next())
                    .unwrap_or("");
                println!(
                    "{:<28} {:<36} {:>8} {:>8} {:>8}  {}",
                    r.model,
                    r.benchmark,
                    fmt_opt(r.score_ceiled),
                    fmt_opt(r.score_raw),
                    fmt_opt(r.error),
                    comment
                );
            }
        }
    }
    Ok(exit_codes::OK)
}
