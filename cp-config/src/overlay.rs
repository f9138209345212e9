//! User configuration overlay
//!
//! Writable keys persist across restarts in a JSON overlay file kept next
//! to the main configuration. Every accepted write rewrites the overlay
//! via a temporary file plus rename so a crash mid-write leaves the
//! previous overlay intact.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("user configuration file not found: {0}")]
    Missing(PathBuf),
    #[error("could not read user configuration {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse user configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Handle to the persisted user configuration overlay.
#[derive(Debug)]
pub struct UserConfigOverlay {
    path: PathBuf,
}

impl UserConfigOverlay {
    /// Open an existing overlay file. The file must already exist, even if
    /// it only contains `{}`; a missing overlay is a deployment error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, OverlayError> {
        let path = path.into();
        if !path.exists() {
            return Err(OverlayError::Missing(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the full overlay document.
    pub fn read(&self) -> Result<Value, OverlayError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| OverlayError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| OverlayError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Record a single `section.key = value` entry: read, modify, write to a
    /// temporary file, rename over the overlay.
    pub fn record(&self, section: &str, key: &str, value: &Value) -> std::io::Result<()> {
        let mut overlay = match self.read() {
            Ok(v) if v.is_object() => v,
            Ok(_) | Err(OverlayError::Parse { .. }) => {
                warn!(
                    "user configuration {} is not a JSON object, starting over",
                    self.path.display()
                );
                Value::Object(serde_json::Map::new())
            }
            Err(OverlayError::Io { source, .. }) => return Err(source),
            Err(OverlayError::Missing(_)) => Value::Object(serde_json::Map::new()),
        };

        overlay[section][key] = value.clone();

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let serialized = serde_json::to_string_pretty(&overlay)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)
    }
}
