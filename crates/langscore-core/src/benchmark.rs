use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{BenchmarkError, RegistryError};
use crate::model::Score;
use crate::subject::Subject;

#[async_trait]
pub trait Benchmark: Send + Sync {
    fn identifier(&self) -> &str;

    fn ceiling(&self) -> Option<f64> {
        None
    }

    async fn score(&self, subject: &mut dyn Subject) -> Result<Score, BenchmarkError>;
}

pub type BenchmarkFactory =
    Arc<dyn Fn() -> anyhow::Result<Box<dyn Benchmark>> + Send + Sync + 'static>;

/// Identifier → factory map. Benchmarks are built lazily on `load`, so
/// listing identifiers never touches benchmark data.
#[derive(Clone, Default)]
pub struct BenchmarkRegistry {
    entries: Vec<(String, BenchmarkFactory)>,
}

impl BenchmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations replace earlier ones with the same identifier.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Benchmark>> + Send + Sync + 'static,
    {
        let id = id.into();
        let factory: BenchmarkFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = factory,
            None => self.entries.push((id, factory)),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn load(&self, id: &str) -> Result<Box<dyn Benchmark>, RegistryError> {
        let (_, factory) = self
            .entries
            .iter()
            .find(|(k, _)| k == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        factory().map_err(|source| RegistryError::Load {
            id: id.to_string(),
            source,
        })
    }
}
