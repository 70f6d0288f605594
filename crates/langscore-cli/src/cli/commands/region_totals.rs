use langscore_core::config::load_config;
use langscore_core::providers::ModelRegistry;
use langscore_core::syntaxgym::SyntaxGymSingleTse;
use serde_json::json;

use super::exit_codes;
use crate::cli::args::RegionTotalsArgs;

pub fn run(args: RegionTotalsArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let Some(suite_dir) = cfg.suite_dir.as_deref() else {
        eprintln!("config error: suite_dir is not set");
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let mut bench = SyntaxGymSingleTse::from_dir(suite_dir, &args.suite)?;
    if let Some(n) = args.limit {
        bench.suite.items.truncate(n);
    }
    let mut subject = match ModelRegistry::from_specs(&cfg.models).load(&args.model) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let totals = match bench.get_region_totals(subject.as_mut()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}: {}", e.type_name(), e);
            return Ok(exit_codes::RUN_FAILED);
        }
    };

    let items: Vec<_> = bench
        .suite
        .items
        .iter()
        .zip(&totals)
        .map(|(item, t)| {
            let regions: Vec<_> = t
                .iter()
                .map(|((condition, region), surprisal)| {
                    json!({ "condition": condition, "region_number": region, "surprisal": surprisal })
                })
                .collect();
            json!({ "item_number": item.item_number, "regions": regions })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "suite": args.suite,
            "model": args.model,
            "items": items,
        }))?
    );
    Ok(exit_codes::OK)
}
