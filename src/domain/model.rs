use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body of `POST /v1/images/generations`. The API defaults
/// `response_format` to `b64_json`, so it is not sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

impl GenerationRequest {
    pub fn new(model: &str, prompt: &str, size: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            n: 1,
            size: size.to_string(),
        }
    }
}

/// `data` and its items may come back as `null`; both read as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub data: Option<Vec<Option<ImageData>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub b64_json: Option<String>,
}

/// One `{name, prompt}` item of a batch manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub saved_files: Vec<PathBuf>,
    pub images_dir: PathBuf,
}
