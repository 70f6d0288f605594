use crate::config::RegistryConfig;
use std::path::{Path, PathBuf};

/// Rewrites relative paths in `config` to be relative to `base_dir`.
pub fn resolve_paths(config: &mut RegistryConfig, base_dir: &Path) {
    resolve_opt(&mut config.suite_dir, base_dir);
    for b in &mut config.benchmarks {
        resolve_opt(&mut b.data, base_dir);
    }
    for m in &mut config.models {
        resolve_opt(&mut m.corpus, base_dir);
    }
}

fn resolve_opt(p: &mut Option<PathBuf>, base_dir: &Path) {
    if let Some(path) = p.as_mut() {
        if path.is_relative() {
            *path = base_dir.join(&*path);
        }
    }
}
