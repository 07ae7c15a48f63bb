//! Paper records and the sources that produce them.

pub mod arxiv;
pub mod utils;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use arxiv::ArxivClient;

/// Normalized metadata for a single paper. This is also the payload
/// attached to every stored point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub arxiv_id: String,
    /// ISO-8601 timestamp, `None` when the source gave no date
    pub published: Option<String>,
    pub pdf_url: String,
    pub primary_category: String,
}

impl Paper {
    /// Text used to build the paper's embedding.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// A stored paper returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPaper {
    #[serde(flatten)]
    pub paper: Paper,
    /// Cosine similarity, higher is more similar
    pub similarity_score: f32,
}

/// Anything that can look up papers for a topic.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Fetch at most `max_results` papers, newest submissions first.
    ///
    /// Either the full normalized list is returned or an error; partial
    /// results are never returned.
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>>;
}
