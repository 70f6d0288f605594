//! Benchmark kinds beyond SyntaxGym and the registry builder that wires
//! every configured benchmark into a [`BenchmarkRegistry`].

use std::path::PathBuf;

use langscore_core::benchmark::{Benchmark, BenchmarkRegistry};
use langscore_core::config::{BenchmarkKind, BenchmarkSpec, RegistryConfig};
use langscore_core::syntaxgym::{self, SyntaxGymSingleTse, SyntaxGymTse};

pub mod data;
pub mod neural;
pub mod reading_times;
pub mod stats;

pub use neural::NeuralRdmBenchmark;
pub use reading_times::ReadingTimesBenchmark;

/// Registers one lazily-built benchmark per config entry, in config order.
pub fn benchmark_registry(cfg: &RegistryConfig) -> BenchmarkRegistry {
    let mut reg = BenchmarkRegistry::new();
    for spec in &cfg.benchmarks {
        register(&mut reg, spec.clone(), cfg.suite_dir.clone());
    }
    reg
}

fn register(reg: &mut BenchmarkRegistry, spec: BenchmarkSpec, suite_dir: Option<PathBuf>) {
    let id = spec.id.clone();
    reg.register(id, move || {
        let dir = || {
            suite_dir.as_deref().ok_or_else(|| {
                anyhow::anyhow!("config error: benchmark '{}' needs suite_dir", spec.id)
            })
        };
        let data_file = || {
            spec.data.as_deref().ok_or_else(|| {
                anyhow::anyhow!("config error: benchmark '{}' needs a data file", spec.id)
            })
        };
        let bench: Box<dyn Benchmark> = match spec.kind {
            BenchmarkKind::Syntaxgym if spec.suites.len() == 1 => {
                Box::new(SyntaxGymSingleTse::from_dir(dir()?, &spec.suites[0])?)
            }
            BenchmarkKind::Syntaxgym => Box::new(SyntaxGymTse::from_dir(
                spec.id.clone(),
                dir()?,
                &spec.suites,
            )?),
            BenchmarkKind::Syntaxgym2020 => Box::new(syntaxgym::syntaxgym2020(dir()?)?),
            BenchmarkKind::ReadingTimes => Box::new(ReadingTimesBenchmark::load(
                spec.id.clone(),
                data_file()?,
                spec.ceiling,
            )?),
            BenchmarkKind::NeuralRdm => Box::new(NeuralRdmBenchmark::load(
                spec.id.clone(),
                data_file()?,
                spec.ceiling,
            )?),
        };
        Ok(bench)
    });
}
