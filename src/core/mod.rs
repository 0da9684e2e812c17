pub mod client;
pub mod generator;
pub mod manifest;
pub mod output;
pub mod pacing;

pub use crate::domain::model::{BatchReport, GenerationRequest, ManifestEntry};
pub use crate::domain::ports::{ConfigProvider, ImageApi, Storage};
pub use crate::utils::error::Result;
