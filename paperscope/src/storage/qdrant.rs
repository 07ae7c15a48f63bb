use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::index::{CollectionInfo, Distance, Hit, Point, VectorIndex};
use crate::papers::Paper;
use crate::{Error, Result};

/// Qdrant over its REST API.
pub struct QdrantClient {
    base_url: String,
    api_key: String,
    client: Client,
}

/// Every Qdrant response wraps its payload in `{"result": .., "status": ..}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f32,
    payload: Option<Paper>,
}

#[derive(Debug, Deserialize)]
struct CollectionResult {
    #[serde(default)]
    vectors_count: Option<u64>,
    #[serde(default)]
    points_count: Option<u64>,
    #[serde(default)]
    config: Option<CollectionConfig>,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    vectors: Option<VectorParams>,
}

#[derive(Debug, Deserialize)]
struct VectorParams {
    size: usize,
    distance: Distance,
}

impl QdrantClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("api-key", &self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("qdrant returned {}: {}", status, body)));
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl VectorIndex for QdrantClient {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let result: CollectionsResult = self.send(self.request(Method::GET, "/collections")).await?;
        Ok(result.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create_collection(&self, name: &str, vector_size: usize, distance: Distance) -> Result<()> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": distance,
            }
        });
        let _: Value = self
            .send(self.request(Method::PUT, &format!("/collections/{}", name)).json(&body))
            .await?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        debug!("Upserting {} points into {}", points.len(), collection);
        let _: Value = self
            .send(
                self.request(Method::PUT, &format!("/collections/{}/points?wait=true", collection))
                    .json(&json!({ "points": points })),
            )
            .await?;
        Ok(())
    }

    async fn search(&self, collection: &str, vector: Vec<f32>, limit: usize) -> Result<Vec<Hit>> {
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        let points: Vec<ScoredPoint> = self
            .send(
                self.request(Method::POST, &format!("/collections/{}/points/search", collection))
                    .json(&body),
            )
            .await?;

        points
            .into_iter()
            .map(|point| {
                let payload = point
                    .payload
                    .ok_or_else(|| Error::Store(format!("point {} has no payload", point.id)))?;
                Ok(Hit {
                    id: point.id.as_u64().unwrap_or_default(),
                    score: point.score,
                    payload,
                })
            })
            .collect()
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo> {
        let result: CollectionResult = self
            .send(self.request(Method::GET, &format!("/collections/{}", collection)))
            .await?;
        let vectors = result.config.and_then(|c| c.params.vectors);

        Ok(CollectionInfo {
            name: collection.to_string(),
            vectors_count: result.vectors_count,
            points_count: result.points_count,
            vector_size: vectors.as_ref().map(|v| v.size),
            distance: vectors.map(|v| v.distance),
        })
    }
}
