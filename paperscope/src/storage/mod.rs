//! Paper storage on top of a vector index.
//!
//! # Storage Model
//!
//! Each paper becomes one point:
//! - id: derived from the arXiv id; storing the same paper twice overwrites
//!   its own point
//! - vector: embedding of `"{title} {summary}"`
//! - payload: the full [`Paper`] record

pub mod index;
pub mod qdrant;

use std::sync::Arc;

use tracing::{info, warn};

use crate::assistant::configuration::Configuration;
use crate::embedding::Embedder;
use crate::papers::{Paper, ScoredPaper};
use crate::{Error, Result};

pub use index::{CollectionInfo, Distance, Hit, Point, VectorIndex};
pub use qdrant::QdrantClient;

pub const COLLECTION_NAME: &str = "paperscope_papers";

/// Text used once to learn the embedding dimensionality.
const DIMENSION_SAMPLE: &str = "test";

pub struct PaperStore {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

/// Stable point id for a paper: the first 8 bytes of the BLAKE3 hash of its
/// arXiv id.
pub fn point_id(arxiv_id: &str) -> u64 {
    let hash = blake3::hash(arxiv_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

impl PaperStore {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            collection: COLLECTION_NAME.to_string(),
        }
    }

    /// Connect to Qdrant using the configured endpoint and key.
    pub fn connect(config: &Configuration, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::NotConfigured(
                "Qdrant not configured. Set QDRANT_URL and QDRANT_API_KEY".to_string(),
            ));
        }
        let (Some(url), Some(api_key)) = (&config.qdrant_url, &config.qdrant_api_key) else {
            return Err(Error::NotConfigured("missing Qdrant credentials".to_string()));
        };
        let index = QdrantClient::new(url.as_str(), api_key.as_str());
        Ok(Self::new(Arc::new(index), embedder))
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Create the collection if it does not exist yet. Safe to call
    /// repeatedly; an existing collection is left untouched.
    pub async fn ensure_collection(&self) -> Result<()> {
        let existing = self.index.list_collections().await?;
        if existing.iter().any(|name| name == &self.collection) {
            info!("Using existing collection: {}", self.collection);
            return Ok(());
        }

        let sample = self.embedder.embed(DIMENSION_SAMPLE).await?;
        self.index
            .create_collection(&self.collection, sample.len(), Distance::Cosine)
            .await?;
        info!(
            "Created collection: {} ({} dims, cosine)",
            self.collection,
            sample.len()
        );
        Ok(())
    }

    /// Embed and upsert `papers` as a single batch. Returns how many were
    /// written; an empty input performs no upsert.
    pub async fn store(&self, papers: &[Paper]) -> Result<usize> {
        if papers.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = papers.iter().map(Paper::embedding_text).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != papers.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                papers.len(),
                vectors.len()
            )));
        }

        let points: Vec<Point> = papers
            .iter()
            .zip(vectors)
            .map(|(paper, vector)| Point {
                id: point_id(&paper.arxiv_id),
                vector,
                payload: paper.clone(),
            })
            .collect();

        self.index.upsert(&self.collection, points).await?;
        info!("Stored {} papers", papers.len());
        Ok(papers.len())
    }

    /// Nearest stored papers to `query`, best first. Failures are logged and
    /// reported as no results.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<ScoredPaper> {
        match self.try_search(query, limit).await {
            Ok(papers) => papers,
            Err(e) => {
                warn!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<ScoredPaper>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).await?;
        let mut hits = self.index.search(&self.collection, vector, limit).await?;
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);

        Ok(hits
            .into_iter()
            .map(|hit| ScoredPaper {
                paper: hit.payload,
                similarity_score: hit.score,
            })
            .collect())
    }

    pub async fn collection_info(&self) -> Result<CollectionInfo> {
        self.index.collection_info(&self.collection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_and_distinct() {
        assert_eq!(point_id("2301.01234v2"), point_id("2301.01234v2"));
        assert_ne!(point_id("2301.01234v2"), point_id("2301.01234v1"));
    }

    #[test]
    fn connect_requires_configuration() {
        struct NoEmbedder;

        #[async_trait::async_trait]
        impl Embedder for NoEmbedder {
            async fn embed(&self, _text: &str) -> Result<crate::embedding::Embedding> {
                Err(Error::Embedding("unused".to_string()))
            }

            fn model_name(&self) -> &str {
                "none"
            }
        }

        let config = Configuration {
            qdrant_url: Some("http://localhost:6333".to_string()),
            ..Configuration::default()
        };
        let result = PaperStore::connect(&config, Arc::new(NoEmbedder));
        assert!(matches!(result, Err(Error::NotConfigured(_))));
    }
}
