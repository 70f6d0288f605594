use langscore_core::config::load_config;
use langscore_core::providers::ModelRegistry;
use serde_json::json;

use super::exit_codes;
use crate::cli::args::{OutputFormat, ValidateArgs};

struct Problem {
    what: String,
    message: String,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, args.strict) {
        Ok(c) => c,
        Err(e) => {
            print_report(
                &[Problem {
                    what: "config".into(),
                    message: e.to_string(),
                }],
                0,
                args.format,
            );
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let benchmarks = langscore_metrics::benchmark_registry(&cfg);
    let models = ModelRegistry::from_specs(&cfg.models);

    let mut problems = Vec::new();
    for id in benchmarks.identifiers() {
        if let Err(e) = benchmarks.load(id) {
            problems.push(Problem {
                what: format!("benchmark {}", id),
                message: format!("{:#}", anyhow::Error::new(e)),
            });
        }
    }
    for id in models.identifiers() {
        if let Err(e) = models.load(id) {
            problems.push(Problem {
                what: format!("model {}", id),
                message: format!("{:#}", anyhow::Error::new(e)),
            });
        }
    }

    let checked = benchmarks.identifiers().len() + models.identifiers().len();
    print_report(&problems, checked, args.format);
    if problems.is_empty() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::CONFIG_ERROR)
    }
}

fn print_report(problems: &[Problem], checked: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let errors: Vec<_> = problems
                .iter()
                .map(|p| json!({ "source": p.what, "message": p.message }))
                .collect();
            let output = json!({
                "schema_version": 1,
                "ok": problems.is_empty(),
                "errors": errors,
                "summary": { "checked": checked },
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
            );
        }
        OutputFormat::Text => {
            if problems.is_empty() {
                println!("OK: {} entries loaded", checked);
            }
            for p in problems {
                println!("error: {}: {}", p.what, p.message);
            }
        }
    }
}
