use crate::errors::ConfigError;
use crate::on_error::ErrorPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod resolve;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Benchmarks and models a deployment can score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    /// Directory holding `<suite>.json` SyntaxGym files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_dir: Option<PathBuf>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkSpec>,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkKind {
    /// One suite, or a composite when `suites` lists several.
    Syntaxgym,
    Syntaxgym2020,
    ReadingTimes,
    NeuralRdm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSpec {
    pub id: String,
    pub kind: BenchmarkKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Bigram,
    RandomEmbedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub kind: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dims: Option<usize>,
}

impl RegistryConfig {
    pub fn benchmark(&self, id: &str) -> Option<&BenchmarkSpec> {
        self.benchmarks.iter().find(|b| b.id == id)
    }
}

pub fn load_config(path: &Path, strict: bool) -> Result<RegistryConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let mut cfg = parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e, path.display())))?;

    let base = path.parent().unwrap_or(Path::new("."));
    resolve::resolve_paths(&mut cfg, base);
    Ok(cfg)
}

/// Parses a config without touching the filesystem; paths stay as written.
pub fn parse_config(raw: &str, strict: bool) -> Result<RegistryConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: RegistryConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // anchors and extension keys are allowed anywhere
    let meaningful: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !meaningful.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                meaningful
            )));
        }
        tracing::warn!(event = "langscore.config.ignored_fields", fields = ?meaningful);
    }

    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for b in &cfg.benchmarks {
        if !seen.insert(b.id.as_str()) {
            return Err(ConfigError(format!("duplicate benchmark id '{}'", b.id)));
        }
        check_benchmark(b, cfg.suite_dir.is_some())?;
    }
    let mut seen = std::collections::HashSet::new();
    for m in &cfg.models {
        if !seen.insert(m.id.as_str()) {
            return Err(ConfigError(format!("duplicate model id '{}'", m.id)));
        }
        if let Some(k) = m.smoothing {
            if !(k.is_finite() && k > 0.0) {
                return Err(ConfigError(format!(
                    "model '{}': smoothing must be > 0, got {}",
                    m.id, k
                )));
            }
        }
    }

    Ok(cfg)
}

fn check_benchmark(b: &BenchmarkSpec, has_suite_dir: bool) -> Result<(), ConfigError> {
    match b.kind {
        BenchmarkKind::Syntaxgym | BenchmarkKind::Syntaxgym2020 if !has_suite_dir => Err(
            ConfigError(format!("benchmark '{}' needs a top-level suite_dir", b.id)),
        ),
        BenchmarkKind::Syntaxgym if b.suites.is_empty() => Err(ConfigError(format!(
            "benchmark '{}' lists no suites",
            b.id
        ))),
        BenchmarkKind::ReadingTimes | BenchmarkKind::NeuralRdm if b.data.is_none() => Err(
            ConfigError(format!("benchmark '{}' needs a data file", b.id)),
        ),
        _ => match b.ceiling {
            Some(c) if c <= 0.0 || c > 1.0 => Err(ConfigError(format!(
                "benchmark '{}': ceiling must be in (0, 1], got {}",
                b.id, c
            ))),
            _ => Ok(()),
        },
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"configVersion: 1
suite_dir: data/syntaxgym
error_policy: abort
benchmarks:
  - id: syntaxgym-2020
    kind: syntaxgym2020
  - id: syntaxgym-cleft
    kind: syntaxgym
    suites: [cleft, cleft_modifier]
  - id: Futrell2018-pearsonr
    kind: reading_times
    data: data/futrell2018.json
  - id: Pereira2018.243sentences-linear
    kind: neural_rdm
    data: data/pereira2018_243sentences.json
models:
  - id: bigram-wiki
    kind: bigram
    corpus: data/corpus.txt
    smoothing: 0.1
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let cfg = parse_config(
            r#"
configVersion: 1
benchmarks:
  - id: rt
    kind: reading_times
    data: rt.json
"#,
            true,
        )
        .unwrap();
        assert_eq!(cfg.benchmarks.len(), 1);
        assert_eq!(cfg.benchmarks[0].kind, BenchmarkKind::ReadingTimes);
        assert_eq!(cfg.error_policy, ErrorPolicy::Abort);
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let raw = "configVersion: 1\nbenchmark: []\n";
        let err = parse_config(raw, true).unwrap_err();
        assert!(err.to_string().contains("Unknown fields"));
        assert!(parse_config(raw, false).is_ok());
    }

    #[test]
    fn syntaxgym_requires_suite_dir_and_suites() {
        let err = parse_config(
            "benchmarks:\n  - id: sg\n    kind: syntaxgym\n    suites: [cleft]\n",
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("suite_dir"));

        let err = parse_config(
            "suite_dir: s\nbenchmarks:\n  - id: sg\n    kind: syntaxgym\n",
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("lists no suites"));
    }

    #[test]
    fn rejects_unknown_version_and_duplicates() {
        assert!(parse_config("configVersion: 7\n", false).is_err());
        let err = parse_config(
            "models:\n  - {id: m, kind: bigram}\n  - {id: m, kind: bigram}\n",
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate model id"));
    }

    #[test]
    fn rejects_non_positive_smoothing() {
        for k in ["0.0", "-1.0"] {
            let raw = format!(
                "models:\n  - {{id: m, kind: bigram, corpus: c.txt, smoothing: {}}}\n",
                k
            );
            let err = parse_config(&raw, true).unwrap_err();
            assert!(err.to_string().contains("smoothing must be > 0"), "{}", err);
        }
        assert!(parse_config(
            "models:\n  - {id: m, kind: bigram, corpus: c.txt, smoothing: 0.5}\n",
            true
        )
        .is_ok());
    }

    #[test]
    fn sample_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langscore.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path, true).unwrap();
        assert_eq!(cfg.benchmarks.len(), 4);
        assert_eq!(cfg.suite_dir.unwrap(), dir.path().join("data/syntaxgym"));
    }
}
