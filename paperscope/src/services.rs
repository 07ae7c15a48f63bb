use std::sync::Arc;

use tracing::info;

use crate::assistant::configuration::Configuration;
use crate::assistant::groq::LanguageModel;
use crate::assistant::qa::QaSystem;
use crate::embedding::FastEmbedder;
use crate::storage::PaperStore;
use crate::{Error, Result};

/// Storage and answering, built once at startup and shared by reference
/// with every request.
pub struct Services {
    pub store: Arc<PaperStore>,
    pub qa: QaSystem,
}

impl Services {
    pub fn new(store: Arc<PaperStore>, llm: Arc<dyn LanguageModel>) -> Self {
        let qa = QaSystem::new(store.clone(), llm);
        Self { store, qa }
    }

    /// Load the embedding model, connect to Qdrant and Groq, and make sure
    /// the collection exists.
    pub async fn connect(config: &Configuration) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::NotConfigured(format!(
                "missing {}",
                config.missing_keys().join(", ")
            )));
        }

        let cache_dir = config.embedding_cache_dir.clone();
        let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(cache_dir.as_deref()))
            .await
            .map_err(|e| Error::Embedding(format!("embedding model loader panicked: {}", e)))??;

        let store = Arc::new(PaperStore::connect(config, Arc::new(embedder))?);
        store.ensure_collection().await?;
        let qa = QaSystem::connect(config, store.clone())?;

        info!("Services ready (collection {})", store.collection_name());
        Ok(Self { store, qa })
    }
}
