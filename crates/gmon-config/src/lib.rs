use anyhow::{Context, Result};
use gmon_anomaly::DetectorConfig;
use gmon_reconcile::MatchMode;
use gmon_schemas::ConfiguredLink;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Effective configuration after layering, with the hash operators quote
/// when comparing deployments.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Merge YAML files in order (earlier files are base, later files
/// override) and hash the canonical result.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; any other value is replaced by the override.
fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Typed monitor configuration
// ---------------------------------------------------------------------------

/// Everything the monitor reads, with operating defaults. Every field is
/// optional in the YAML; an empty document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub monitor: MonitorSection,
    pub reconcile: ReconcileSection,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Seconds of silence before a publisher stream counts as timed out.
    pub heartbeat_timeout_secs: f64,
    /// Bounded packet window kept for on-demand detection.
    pub window_capacity: usize,
    pub bind_addr: String,
    /// Configured-links YAML; reconciliation runs against an empty topology
    /// when absent.
    pub links_file: Option<String>,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: 2.0,
            window_capacity: 10_000,
            bind_addr: "127.0.0.1:8095".to_string(),
            links_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSection {
    pub match_mode: MatchMode,
}

impl MonitorConfig {
    /// Extract the typed view from an already-merged config value.
    pub fn from_value(v: &Value) -> Result<Self> {
        serde_json::from_value(v.clone()).context("monitor config has invalid shape")
    }
}

/// Layer the given YAML files and extract the typed monitor config in one
/// step. No paths means all defaults, with the hash of `{}`.
pub fn load_monitor_config(paths: &[&str]) -> Result<(MonitorConfig, LoadedConfig)> {
    let loaded = load_layered_yaml(paths)?;
    let cfg = MonitorConfig::from_value(&loaded.config_json)?;
    Ok((cfg, loaded))
}

// ---------------------------------------------------------------------------
// Configured-links file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LinksFile {
    #[serde(default)]
    links: Vec<ConfiguredLink>,
}

/// Load the flat list of engineered links produced by the upstream SCL
/// extraction step.
pub fn load_links_yaml(path: &str) -> Result<Vec<ConfiguredLink>> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read links file: {path}"))?;
    load_links_from_str(&raw).with_context(|| format!("invalid links file: {path}"))
}

pub fn load_links_from_str(raw: &str) -> Result<Vec<ConfiguredLink>> {
    let file: LinksFile = serde_yaml::from_str(raw).context("invalid links yaml")?;
    Ok(file.links)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
