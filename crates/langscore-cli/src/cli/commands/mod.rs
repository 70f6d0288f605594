use std::path::Path;

use langscore_core::storage::Store;

use crate::cli::args::{Cli, Command};

pub mod benchmarks;
pub mod db;
pub mod region_totals;
pub mod score;
pub mod scores;
pub mod validate;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Score(args) => score::run(args).await,
        Command::Db(args) => db::run(args),
        Command::Scores(args) => scores::run(args),
        Command::Benchmarks(args) => benchmarks::run(args),
        Command::RegionTotals(args) => region_totals::run(args),
        Command::Validate(args) => validate::run(args),
        Command::Init(args) => {
            if args.config.exists() {
                eprintln!("{} already exists", args.config.display());
                return Ok(exit_codes::CONFIG_ERROR);
            }
            langscore_core::config::write_sample_config(&args.config)?;
            eprintln!("wrote {}", args.config.display());
            Ok(exit_codes::OK)
        }
    }
}

/// Opens (creating parent directories) and migrates the score database.
/// `:memory:` gives a throwaway in-memory store.
pub(crate) fn open_store(db: &Path) -> anyhow::Result<Store> {
    let store = if db == Path::new(":memory:") {
        Store::memory()?
    } else {
        if let Some(parent) = db.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Store::open(db)?
    };
    store.init_schema()?;
    Ok(store)
}
