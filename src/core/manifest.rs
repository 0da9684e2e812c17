use crate::core::output::is_plain_file_name;
use crate::domain::model::ManifestEntry;
use crate::utils::error::{ImageGenError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A batch prompts file, fully validated at load time so that a bad entry
/// anywhere aborts the run before the first request.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        if !path.exists() {
            return Err(ImageGenError::manifest(format!(
                "prompts file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ImageGenError::manifest(format!("Failed to read prompts file: {}", e))
        })?;

        let entries = Self::parse(&content)?;
        tracing::debug!("Loaded {} manifest entries from {}", entries.len(), path.display());

        Ok(Self { path, entries })
    }

    pub fn parse(content: &str) -> Result<Vec<ManifestEntry>> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            ImageGenError::manifest(format!("Failed to read prompts file: {}", e))
        })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Vec<ManifestEntry>> {
        let items = value.as_array().ok_or_else(|| {
            ImageGenError::manifest("prompts file must contain a JSON array of {name,prompt}")
        })?;

        items
            .iter()
            .enumerate()
            .map(|(idx, item)| Self::entry_at(idx, item))
            .collect()
    }

    fn entry_at(idx: usize, item: &Value) -> Result<ManifestEntry> {
        let obj = item.as_object().ok_or_else(|| {
            ImageGenError::manifest(format!(
                "Invalid item at index {}: expected object with name/prompt",
                idx
            ))
        })?;

        let field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        let (Some(name), Some(prompt)) = (field("name"), field("prompt")) else {
            return Err(ImageGenError::manifest(format!(
                "Missing name or prompt at index {}",
                idx
            )));
        };

        if !is_plain_file_name(&name) {
            return Err(ImageGenError::manifest(format!(
                "Invalid name at index {}: '{}' must be a plain file name",
                idx, name
            )));
        }

        Ok(ManifestEntry { name, prompt })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
