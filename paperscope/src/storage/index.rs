//! Vector index abstraction.
//!
//! The paper store only ever needs a handful of collection and point
//! operations, so the remote database sits behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::papers::Paper;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
    Manhattan,
}

/// One stored (id, vector, payload) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Paper,
}

/// A search hit as returned by the index, best first.
#[derive(Debug, Clone)]
pub struct Hit {
    pub id: u64,
    pub score: f32,
    pub payload: Paper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub vectors_count: Option<u64>,
    pub points_count: Option<u64>,
    pub vector_size: Option<usize>,
    pub distance: Option<Distance>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<String>>;

    async fn create_collection(&self, name: &str, vector_size: usize, distance: Distance) -> Result<()>;

    /// Insert or overwrite points as one batch.
    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()>;

    async fn search(&self, collection: &str, vector: Vec<f32>, limit: usize) -> Result<Vec<Hit>>;

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo>;
}
