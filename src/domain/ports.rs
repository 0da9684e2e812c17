use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// Absolute directory files are written beneath.
    fn root(&self) -> PathBuf;

    /// Absolute location a relative `path` resolves to.
    fn locate(&self, path: &str) -> PathBuf;

    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn model(&self) -> &str;
    fn size(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_on_rate_limit(&self) -> bool;
}

/// Text-to-image backend returning decoded image bytes.
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}
