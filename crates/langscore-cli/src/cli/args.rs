use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "langscore",
    version,
    about = "Scores language models against behavioural and neural benchmarks"
)]
pub struct Cli {
    /// tracing filter, e.g. "info" or "langscore_core=debug"
    #[arg(long, global = true, env = "LANGSCORE_LOG", default_value = "info")]
    pub log_level: String,

    /// emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score the models of a submission on benchmarks and store the results
    Score(ScoreArgs),
    /// Manage the score database
    Db(DbArgs),
    /// List stored scores
    Scores(ScoresArgs),
    /// List configured benchmarks
    Benchmarks(BenchmarksArgs),
    /// Print per-region surprisal totals of a model on one suite
    RegionTotals(RegionTotalsArgs),
    /// Check that every configured benchmark and model can be loaded
    Validate(ValidateArgs),
    /// Write a sample config file
    Init(InitArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    Abort,
    Record,
}

#[derive(clap::Args, Clone)]
pub struct ScoreArgs {
    #[arg(long, default_value = "langscore.yaml")]
    pub config: PathBuf,
    #[arg(long, default_value = ".langscore/scores.db")]
    pub db: PathBuf,

    /// reject unknown config keys
    #[arg(long)]
    pub strict: bool,

    /// job arguments as a JSON file; replaces the individual flags below
    #[arg(long, conflicts_with_all = ["job_id", "models", "benchmarks"])]
    pub args_json: Option<PathBuf>,

    #[arg(long, required_unless_present = "args_json")]
    pub job_id: Option<i64>,
    #[arg(long, default_value_t = 1)]
    pub user_id: i64,
    #[arg(long, default_value = "artificialsubject")]
    pub model_type: String,
    #[arg(long)]
    pub public: bool,
    /// competition name; "None" means no competition
    #[arg(long)]
    pub competition: Option<String>,
    #[arg(long = "models", num_args = 1.., required_unless_present = "args_json")]
    pub models: Vec<String>,
    #[arg(long = "benchmarks", num_args = 1.., required_unless_present = "args_json")]
    pub benchmarks: Vec<String>,
    /// only score the given models on the given benchmarks
    #[arg(long)]
    pub specified_only: bool,

    /// override the config's error_policy
    #[arg(long, value_enum)]
    pub on_error: Option<OnError>,

    /// print full diagnostics including source locations
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Clone)]
pub struct DbArgs {
    #[command(subcommand)]
    pub cmd: DbSub,
}

#[derive(Subcommand, Clone)]
pub enum DbSub {
    /// Create tables if missing
    Init {
        #[arg(long, default_value = ".langscore/scores.db")]
        db: PathBuf,
    },
    /// Delete every row, keeping the schema
    Clear {
        #[arg(long, default_value = ".langscore/scores.db")]
        db: PathBuf,
    },
    /// Add a submitting user
    AddUser {
        #[arg(long, default_value = ".langscore/scores.db")]
        db: PathBuf,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        email: String,
        #[arg(long)]
        staff: bool,
    },
}

#[derive(clap::Args, Clone)]
pub struct ScoresArgs {
    #[arg(long, default_value = ".langscore/scores.db")]
    pub db: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Clone)]
pub struct BenchmarksArgs {
    #[arg(long, default_value = "langscore.yaml")]
    pub config: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Clone)]
pub struct RegionTotalsArgs {
    #[arg(long, default_value = "langscore.yaml")]
    pub config: PathBuf,
    /// suite name, read from `<suite_dir>/<suite>.json`
    #[arg(long)]
    pub suite: String,
    #[arg(long)]
    pub model: String,
    /// only the first N items
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Clone)]
pub struct ValidateArgs {
    #[arg(long, default_value = "langscore.yaml")]
    pub config: PathBuf,
    #[arg(long)]
    pub strict: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "langscore.yaml")]
    pub config: PathBuf,
}
