use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use super::{Embedder, Embedding};
use crate::{Error, Result};

/// Local sentence embeddings with all-MiniLM-L6-v2 (ONNX runtime).
///
/// The model is downloaded into the cache directory on first use. Inference
/// runs on the blocking thread pool so it never stalls the async workers.
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedder {
    pub fn new(cache_dir: Option<&str>) -> Result<Self> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(PathBuf::from(dir));
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("failed to load embedding model: {}", e)))?;
        info!("Loaded embedding model all-MiniLM-L6-v2");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let model = model
                .lock()
                .map_err(|_| Error::Embedding("embedding model lock poisoned".to_string()))?;
            let embeddings = model.embed(texts, None);
            embeddings.map_err(|e| Error::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| Error::Embedding(format!("embedding task failed: {}", e)))?
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.run(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.to_vec()).await
    }

    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model", &self.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "current_thread")]
    #[ignore = "downloads the embedding model"]
    async fn inference_leaves_the_runtime_free() {
        let embedder = FastEmbedder::new(None).unwrap();
        let texts: Vec<String> = (0..64).map(|i| format!("paper abstract number {}", i)).collect();

        let ticker = tokio::spawn(async {
            let mut ticks = 0;
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(1)).await;
                ticks += 1;
            }
            ticks
        });
        let embeddings = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 64);
        assert_eq!(embeddings[0].len(), 384);
        assert_eq!(ticker.await.unwrap(), 5);
    }
}
