use std::sync::Arc;

use crate::config::{ModelKind, ModelSpec};
use crate::errors::RegistryError;
use crate::subject::Subject;

pub mod embedding;
pub mod ngram;

pub use embedding::RandomEmbeddingSubject;
pub use ngram::BigramSubject;

pub type ModelFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Subject>> + Send + Sync + 'static>;

/// Resolves model identifiers to fresh subjects.
///
/// `randomembedding-<dims>` is always resolvable; everything else must be
/// registered, usually from the `models` section of the config.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<(String, ModelFactory)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[ModelSpec]) -> Self {
        let mut reg = Self::new();
        for spec in specs {
            reg.register_spec(spec.clone());
        }
        reg
    }

    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Subject>> + Send + Sync + 'static,
    {
        let id = id.into();
        let factory: ModelFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = factory,
            None => self.entries.push((id, factory)),
        }
    }

    pub fn register_spec(&mut self, spec: ModelSpec) {
        let id = spec.id.clone();
        match spec.kind {
            ModelKind::Bigram => self.register(id.clone(), move || {
                let corpus = spec.corpus.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("config error: bigram model '{}' needs a corpus", spec.id)
                })?;
                let k = spec.smoothing.unwrap_or(ngram::DEFAULT_SMOOTHING);
                if !(k.is_finite() && k > 0.0) {
                    anyhow::bail!(
                        "config error: bigram model '{}' needs smoothing > 0, got {}",
                        spec.id,
                        k
                    );
                }
                Ok(Box::new(BigramSubject::from_corpus_file(&spec.id, corpus, k)?)
                    as Box<dyn Subject>)
            }),
            ModelKind::RandomEmbedding => self.register(id, move || {
                let dims = spec.dims.ok_or_else(|| {
                    anyhow::anyhow!("config error: random_embedding model '{}' needs dims", spec.id)
                })?;
                Ok(Box::new(RandomEmbeddingSubject::new(dims)) as Box<dyn Subject>)
            }),
        }
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn load(&self, id: &str) -> Result<Box<dyn Subject>, RegistryError> {
        if let Some((_, factory)) = self.entries.iter().find(|(k, _)| k == id) {
            return factory().map_err(|source| RegistryError::Load {
                id: id.to_string(),
                source,
            });
        }
        RandomEmbeddingSubject::from_identifier(id)
            .map(|s| Box::new(s) as Box<dyn Subject>)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }
}
