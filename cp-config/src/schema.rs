//! Profile schema service
//!
//! Each feature profile section of the configuration document may carry a
//! schema file (`Internal.json`, `Core.json`, `Custom.json`, ...) describing
//! its keys: declared type, `readOnly` flag, defaults and numeric bounds.
//! The store consumes this in three ways: patching defaults into a freshly
//! parsed document, resolving the writability of Custom keys, and coercing
//! Custom write values into their declared type.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::validators;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("could not read schema file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse schema file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Schema of a single key within a profile section.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertySchema {
    /// Declared JSON type; either a string ("integer", "boolean", ...) or a
    /// list of alternatives (["string", "array"]).
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SectionSchema {
    #[serde(default)]
    properties: HashMap<String, PropertySchema>,
}

/// The loaded schemas for all profile sections.
#[derive(Debug, Default)]
pub struct ProfileSchemas {
    sections: HashMap<String, SectionSchema>,
}

impl ProfileSchemas {
    /// Load every `<Section>.json` schema from a directory. Sections without
    /// a schema file are simply unknown to the service.
    pub fn load_dir(dir: &Path) -> Result<Self, SchemaError> {
        let mut sections = HashMap::new();
        let entries = fs::read_dir(dir).map_err(|source| SchemaError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| SchemaError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(section) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let schema: SectionSchema =
                serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            debug!(
                "loaded schema for section {} ({} keys)",
                section,
                schema.properties.len()
            );
            sections.insert(section.to_string(), schema);
        }
        Ok(Self { sections })
    }

    /// Register a section schema from an in-memory JSON value.
    pub fn insert_section(&mut self, section: &str, schema: Value) -> Result<(), SchemaError> {
        let parsed: SectionSchema =
            serde_json::from_value(schema).map_err(|source| SchemaError::Parse {
                path: section.to_string(),
                source,
            })?;
        self.sections.insert(section.to_string(), parsed);
        Ok(())
    }

    /// Patch schema defaults into the document for keys that are missing.
    pub fn apply_defaults(&self, document: &mut Value) {
        for (section, schema) in &self.sections {
            for (key, prop) in &schema.properties {
                let Some(default) = &prop.default else {
                    continue;
                };
                let slot = &mut document[section.as_str()];
                if slot.is_null() {
                    *slot = Value::Object(serde_json::Map::new());
                }
                if let Some(obj) = slot.as_object_mut() {
                    if !obj.contains_key(key) {
                        obj.insert(key.clone(), default.clone());
                    }
                }
            }
        }
    }

    /// Whether a section/key pair is described by a schema.
    pub fn knows(&self, section: &str, key: &str) -> bool {
        self.property(section, key).is_some()
    }

    /// Schema-declared `readOnly` flag for a key.
    pub fn read_only(&self, section: &str, key: &str) -> Option<bool> {
        self.property(section, key).map(|p| p.read_only)
    }

    /// Coerce a raw write value into the key's schema-declared type.
    /// Returns `None` when the value does not fit the type.
    pub fn coerce(&self, section: &str, key: &str, raw: &str) -> Option<Value> {
        let prop = self.property(section, key)?;
        let kinds = declared_kinds(prop);
        for kind in kinds {
            match kind {
                "boolean" => {
                    if let Some(b) = validators::parse_bool(raw) {
                        return Some(Value::Bool(b));
                    }
                }
                "integer" => {
                    if let Ok(n) = raw.trim().parse::<i64>() {
                        if in_bounds(prop, n as f64) {
                            return Some(Value::from(n));
                        }
                    }
                }
                "number" => {
                    if let Ok(n) = raw.trim().parse::<f64>() {
                        if in_bounds(prop, n) {
                            return Some(Value::from(n));
                        }
                    }
                }
                "array" | "object" => {
                    if let Ok(v) = serde_json::from_str::<Value>(raw) {
                        if (kind == "array" && v.is_array())
                            || (kind == "object" && v.is_object())
                        {
                            return Some(v);
                        }
                    }
                }
                "string" => return Some(Value::String(raw.to_string())),
                _ => {}
            }
        }
        None
    }

    fn property(&self, section: &str, key: &str) -> Option<&PropertySchema> {
        self.sections.get(section)?.properties.get(key)
    }

    /// Key names of a section, for enumerating Custom keys.
    pub fn section_keys(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(section)
            .map(|s| s.properties.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn declared_kinds(prop: &PropertySchema) -> Vec<&str> {
    match &prop.kind {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).collect(),
        // untyped schemas accept anything as text
        _ => vec!["string"],
    }
}

fn in_bounds(prop: &PropertySchema, n: f64) -> bool {
    if let Some(min) = prop.minimum {
        if n < min {
            return false;
        }
    }
    if let Some(max) = prop.maximum {
        if n > max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas() -> ProfileSchemas {
        let mut s = ProfileSchemas::default();
        s.insert_section(
            "Custom",
            json!({
                "properties": {
                    "OperatorTag": { "type": "string", "readOnly": false },
                    "HardwareRevision": { "type": "string", "readOnly": true },
                    "DisplayTimeout": { "type": "integer", "minimum": 0, "maximum": 3600 },
                    "ExtraPayload": { "type": ["string", "array"] }
                }
            }),
        )
        .unwrap();
        s.insert_section(
            "Core",
            json!({
                "properties": {
                    "HeartbeatInterval": { "type": "integer", "default": 86400 }
                }
            }),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_defaults_patch_only_missing() {
        let s = schemas();
        let mut doc = json!({ "Core": { "NumberOfConnectors": 2 } });
        s.apply_defaults(&mut doc);
        assert_eq!(doc["Core"]["HeartbeatInterval"], json!(86400));
        assert_eq!(doc["Core"]["NumberOfConnectors"], json!(2));

        let mut doc = json!({ "Core": { "HeartbeatInterval": 60 } });
        s.apply_defaults(&mut doc);
        assert_eq!(doc["Core"]["HeartbeatInterval"], json!(60));
    }

    #[test]
    fn test_read_only_lookup() {
        let s = schemas();
        assert_eq!(s.read_only("Custom", "HardwareRevision"), Some(true));
        assert_eq!(s.read_only("Custom", "OperatorTag"), Some(false));
        assert_eq!(s.read_only("Custom", "Unknown"), None);
    }

    #[test]
    fn test_coerce_types() {
        let s = schemas();
        assert_eq!(
            s.coerce("Custom", "DisplayTimeout", "300"),
            Some(json!(300))
        );
        assert_eq!(s.coerce("Custom", "DisplayTimeout", "7200"), None);
        assert_eq!(s.coerce("Custom", "DisplayTimeout", "soon"), None);
        assert_eq!(
            s.coerce("Custom", "OperatorTag", "west-lot"),
            Some(json!("west-lot"))
        );
        // alternatives: accepted as plain string when not a JSON array
        assert_eq!(
            s.coerce("Custom", "ExtraPayload", "[1,2]"),
            Some(json!("[1,2]"))
        );
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Internal.json"),
            r#"{ "properties": { "MaxMessageSize": { "type": "integer", "default": 65536 } } }"#,
        )
        .unwrap();
        let s = ProfileSchemas::load_dir(dir.path()).unwrap();
        assert!(s.knows("Internal", "MaxMessageSize"));
        let mut doc = json!({});
        s.apply_defaults(&mut doc);
        assert_eq!(doc["Internal"]["MaxMessageSize"], json!(65536));
    }
}
