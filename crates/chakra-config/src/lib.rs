//! chakra-config
//!
//! Layered YAML config loading, `--params` JSON strategy overrides, and
//! canonical-JSON config hashing for the run fingerprint (spec §6, §9
//! determinism requirement: "two runs with identical inputs, config, and
//! worker count produce... identical fingerprints").

mod error;

pub use error::ConfigError;

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Load + merge YAML files in order, then canonicalize to JSON and hash.
/// Later files override earlier files via deep-merge.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig, ConfigError> {
    let mut contents = Vec::with_capacity(paths.len());
    for p in paths {
        let s = fs::read_to_string(p).map_err(|e| ConfigError::Io(p.to_string(), e.to_string()))?;
        contents.push(s);
    }
    let refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&refs)
}

/// Same as [`load_layered_yaml`] but takes already-in-memory YAML text —
/// what the test suite uses, and what the CLI uses once it has read the
/// files itself.
pub fn load_layered_yaml_from_strings(layers: &[&str]) -> Result<LoadedConfig, ConfigError> {
    let mut merged = Value::Object(Default::default());

    for (i, layer) in layers.iter().enumerate() {
        let yaml_val: serde_yaml::Value =
            serde_yaml::from_str(layer).map_err(|e| ConfigError::InvalidYaml(i, e.to_string()))?;
        let json_val = serde_json::to_value(yaml_val).map_err(|e| ConfigError::InvalidYaml(i, e.to_string()))?;
        deep_merge(&mut merged, json_val);
    }

    finish(merged)
}

/// Parse `--params <json>` and deep-merge it on top of an already-loaded
/// config as the final, highest-priority layer (spec §6: "`--params`
/// strategy overrides").
pub fn apply_params_override(base: &LoadedConfig, params_json: &str) -> Result<LoadedConfig, ConfigError> {
    let overlay: Value = serde_json::from_str(params_json).map_err(|e| ConfigError::InvalidParams(e.to_string()))?;
    if !overlay.is_object() {
        return Err(ConfigError::InvalidParams("--params must be a JSON object".to_string()));
    }
    let mut merged = base.config_json.clone();
    deep_merge(&mut merged, overlay);
    finish(merged)
}

fn finish(merged: Value) -> Result<LoadedConfig, ConfigError> {
    let canonical = canonicalize_json(&merged);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = hex::encode(hasher.finalize());

    Ok(LoadedConfig {
        config_json: serde_json::from_str(&canonical).expect("canonicalized JSON must reparse"),
        canonical_json: canonical,
        config_hash: hash,
    })
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_json: Value,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Deep-merge: objects merge recursively; arrays and scalars are replaced wholesale.
fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}

/// Canonicalize JSON by sorting all object keys recursively and emitting
/// compact JSON — reordering a YAML layer's keys must not change the hash.
fn canonicalize_json(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("canonicalized value must serialize")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}
