//! Text embedding.
//!
//! Storage and search must embed with the same model, so a single
//! [`Embedder`] instance is shared by the paper store for the lifetime of the
//! process.

mod fastembed;

use async_trait::async_trait;

use crate::Result;

pub use self::fastembed::FastEmbedder;

/// A vector embedding
pub type Embedding = Vec<f32>;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str;
}
