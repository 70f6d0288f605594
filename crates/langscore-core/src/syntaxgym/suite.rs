use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub meta: SuiteMeta,
    #[serde(default)]
    pub region_meta: BTreeMap<String, String>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "type", default = "default_prediction_type")]
    pub kind: String,
    pub formula: String,
}

fn default_prediction_type() -> String {
    "formula".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_number: u32,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub condition_name: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub region_number: u32,
    #[serde(default)]
    pub content: String,
}

impl Suite {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let suite: Suite = serde_json::from_str(s).context("failed to parse suite JSON")?;
        suite.check()?;
        Ok(suite)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read suite {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid suite {}", path.display()))
    }

    /// Loads `<dir>/<name>.json`.
    pub fn load_named(dir: &Path, name: &str) -> anyhow::Result<Self> {
        Self::load(&dir.join(format!("{}.json", name)))
    }

    fn check(&self) -> anyhow::Result<()> {
        for p in &self.predictions {
            if p.kind != "formula" {
                anyhow::bail!(
                    "suite '{}': unsupported prediction type '{}'",
                    self.meta.name,
                    p.kind
                );
            }
        }
        for item in &self.items {
            let mut seen = std::collections::HashSet::new();
            for c in &item.conditions {
                if !seen.insert(c.condition_name.as_str()) {
                    anyhow::bail!(
                        "suite '{}': item {} repeats condition '{}'",
                        self.meta.name,
                        item.item_number,
                        c.condition_name
                    );
                }
            }
        }
        Ok(())
    }
}
