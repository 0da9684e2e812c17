use crate::core::manifest::Manifest;
use crate::core::output::{batch_file_name, ensure_png_extension};
use crate::core::pacing::{Pacer, NEXT_REQUEST_COUNTDOWN};
use crate::core::{ImageApi, Storage};
use crate::domain::model::BatchReport;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Drives single and batch generation. Requests are strictly sequential.
pub struct ImageGenerator<A: ImageApi, S: Storage> {
    api: A,
    storage: S,
    pacer: Pacer,
    batch_delay_secs: u64,
}

impl<A: ImageApi, S: Storage> ImageGenerator<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            pacer: Pacer::default(),
            batch_delay_secs: crate::config::settings::DEFAULT_BATCH_DELAY_SECS,
        }
    }

    pub fn with_batch_delay(mut self, secs: u64) -> Self {
        self.batch_delay_secs = secs;
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub async fn generate_single(&self, prompt: &str, output: &str) -> Result<PathBuf> {
        self.generate_to(prompt, &ensure_png_extension(output)).await
    }

    pub async fn generate_batch(&self, manifest: &Manifest) -> Result<BatchReport> {
        let total = manifest.len();
        let mut saved_files = Vec::with_capacity(total);

        tracing::info!("🚀 Starting batch of {} images", total);

        for (idx, entry) in manifest.entries.iter().enumerate() {
            tracing::info!("[{}/{}] {}", idx + 1, total, entry.name);
            let saved = self
                .generate_to(&entry.prompt, &batch_file_name(&entry.name))
                .await?;

            println!("{}", saved.display());
            saved_files.push(saved);

            if idx + 1 < total {
                println!("Waiting {}s before next image...", self.batch_delay_secs);
                self.pacer
                    .countdown(self.batch_delay_secs, NEXT_REQUEST_COUNTDOWN)
                    .await;
            }
        }

        let images_dir = self.storage.root();
        if !saved_files.is_empty() {
            println!("Saved {} images to {}", saved_files.len(), images_dir.display());
        }

        Ok(BatchReport {
            saved_files,
            images_dir,
        })
    }

    async fn generate_to(&self, prompt: &str, file_name: &str) -> Result<PathBuf> {
        tracing::debug!("Generating {} from prompt: {}", file_name, prompt);
        let bytes = self.api.generate(prompt).await?;
        let saved = self.storage.write_file(file_name, &bytes).await?;
        tracing::info!("✅ Saved {} ({} bytes)", saved.display(), bytes.len());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ManifestEntry;
    use crate::utils::error::ImageGenError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        fn root(&self) -> PathBuf {
            PathBuf::from("/mock")
        }

        fn locate(&self, path: &str) -> PathBuf {
            Path::new("/mock").join(path)
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<PathBuf> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(self.locate(path))
        }
    }

    /// Echoes the prompt back as image bytes; fails on the `fail_on`-th call.
    struct EchoApi {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl EchoApi {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(call),
            }
        }
    }

    #[async_trait]
    impl ImageApi for EchoApi {
        async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                return Err(ImageGenError::ApiError {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(prompt.as_bytes().to_vec())
        }
    }

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        Manifest {
            path: PathBuf::from("/mock/prompts.json"),
            entries: entries
                .iter()
                .map(|(name, prompt)| ManifestEntry {
                    name: name.to_string(),
                    prompt: prompt.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_single_appends_png() {
        let storage = MockStorage::new();
        let generator = ImageGenerator::new(EchoApi::new(), storage.clone());

        let saved = generator.generate_single("a cat", "cat").await.unwrap();

        assert_eq!(saved, PathBuf::from("/mock/cat.png"));
        assert_eq!(storage.get_file("cat.png").await.unwrap(), b"a cat");
    }

    #[tokio::test]
    async fn test_single_keeps_existing_png() {
        let storage = MockStorage::new();
        let generator = ImageGenerator::new(EchoApi::new(), storage.clone());

        generator.generate_single("a dog", "Dog.PNG").await.unwrap();

        assert!(storage.get_file("Dog.PNG").await.is_some());
        assert!(storage.get_file("Dog.PNG.png").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_writes_every_entry_in_order() {
        let storage = MockStorage::new();
        let generator = ImageGenerator::new(EchoApi::new(), storage.clone())
            .with_pacer(Pacer::quiet())
            .with_batch_delay(25);

        let start = tokio::time::Instant::now();
        let report = generator
            .generate_batch(&manifest(&[("one", "first"), ("two", "second"), ("three", "third")]))
            .await
            .unwrap();

        assert_eq!(
            report.saved_files,
            vec![
                PathBuf::from("/mock/one.png"),
                PathBuf::from("/mock/two.png"),
                PathBuf::from("/mock/three.png"),
            ]
        );
        assert_eq!(report.images_dir, PathBuf::from("/mock"));
        assert_eq!(storage.get_file("two.png").await.unwrap(), b"second");
        // 只在項目之間等待，最後一張之後不等
        assert_eq!(start.elapsed(), std::time::Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_batch_stops_at_first_failure() {
        let storage = MockStorage::new();
        let generator = ImageGenerator::new(EchoApi::failing_on(2), storage.clone())
            .with_pacer(Pacer::quiet())
            .with_batch_delay(0);

        let err = generator
            .generate_batch(&manifest(&[("a", "x"), ("b", "y"), ("c", "z")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::ApiError { status: 500, .. }));
        assert!(storage.get_file("a.png").await.is_some());
        assert!(storage.get_file("b.png").await.is_none());
        assert!(storage.get_file("c.png").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let generator = ImageGenerator::new(EchoApi::new(), MockStorage::new());
        let report = generator.generate_batch(&manifest(&[])).await.unwrap();
        assert!(report.saved_files.is_empty());
    }
}
