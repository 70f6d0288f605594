pub mod runner;

pub use runner::{PairOutcome, ScoringRunner};
