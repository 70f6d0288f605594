pub mod benchmark;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod on_error;
pub mod providers;
pub mod report;
pub mod storage;
pub mod subject;
pub mod syntaxgym;
