use langscore_core::config::load_config;
use serde_json::json;

use super::exit_codes;
use crate::cli::args::{BenchmarksArgs, OutputFormat};

pub fn run(args: BenchmarksArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    match args.format {
        OutputFormat::Json => {
            let list: Vec<_> = cfg
                .benchmarks
                .iter()
                .map(|b| json!({ "id": b.id, "kind": b.kind, "suites": b.suites, "ceiling": b.ceiling }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            for b in &cfg.benchmarks {
                let kind = serde_json::to_value(b.kind)?;
                let kind = kind.as_str().unwrap_or_default();
                if b.suites.is_empty() {
                    println!("{:<40} {}", b.id, kind);
                } else {
                    println!("{:<40} {} [{}]", b.id, kind, b.suites.join(", "));
                }
            }
        }
    }
    Ok(exit_codes::OK)
}
