#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paperscope::assistant::groq::LanguageModel;
use paperscope::embedding::{Embedder, Embedding};
use paperscope::papers::{Paper, PaperSource};
use paperscope::storage::{CollectionInfo, Distance, Hit, PaperStore, Point, VectorIndex};
use paperscope::{Error, Result, Services};

pub const DIMS: usize = 256;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket.
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = blake3::hash(word.to_lowercase().as_bytes());
            let bucket = hash.as_bytes()[0] as usize % DIMS;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "hash-bow"
    }
}

struct Collection {
    size: usize,
    distance: Distance,
    points: BTreeMap<u64, Point>,
}

/// In-memory stand-in for Qdrant with brute-force cosine search.
#[derive(Default)]
pub struct MemoryIndex {
    collections: Mutex<HashMap<String, Collection>>,
    pub create_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub fail_upsert: AtomicBool,
    pub fail_search: AtomicBool,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl MemoryIndex {
    pub fn point_count(&self, name: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .map(|c| c.points.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }

    async fn create_collection(&self, name: &str, vector_size: usize, distance: Distance) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(name) {
            return Err(Error::Store(format!("collection {} already exists", name)));
        }
        collections.insert(
            name.to_string(),
            Collection {
                size: vector_size,
                distance,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(Error::Store("upsert rejected".to_string()));
        }
        let mut collections = self.collections.lock().unwrap();
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| Error::Store(format!("no collection {}", collection)))?;
        if let Some(bad) = points.iter().find(|p| p.vector.len() != target.size) {
            return Err(Error::Store(format!("point {} has wrong dimension", bad.id)));
        }
        for point in points {
            target.points.insert(point.id, point);
        }
        Ok(())
    }

    async fn search(&self, collection: &str, vector: Vec<f32>, limit: usize) -> Result<Vec<Hit>> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(Error::Store("search unavailable".to_string()));
        }
        let collections = self.collections.lock().unwrap();
        let target = collections
            .get(collection)
            .ok_or_else(|| Error::Store(format!("no collection {}", collection)))?;

        let mut hits: Vec<Hit> = target
            .points
            .values()
            .map(|p| Hit {
                id: p.id,
                score: cosine(&vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo> {
        let collections = self.collections.lock().unwrap();
        let target = collections
            .get(collection)
            .ok_or_else(|| Error::Store(format!("no collection {}", collection)))?;
        Ok(CollectionInfo {
            name: collection.to_string(),
            vectors_count: Some(target.points.len() as u64),
            points_count: Some(target.points.len() as u64),
            vector_size: Some(target.size),
            distance: Some(target.distance),
        })
    }
}

/// Language model that replays a fixed reply and records its prompts.
pub struct ScriptedModel {
    reply: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(Error::Llm)
    }
}

/// Paper source returning a fixed list, or failing every call.
pub struct StaticSource {
    papers: Option<Vec<Paper>>,
}

impl StaticSource {
    pub fn new(papers: Vec<Paper>) -> Self {
        Self { papers: Some(papers) }
    }

    pub fn failing() -> Self {
        Self { papers: None }
    }
}

#[async_trait]
impl PaperSource for StaticSource {
    async fn fetch(&self, _topic: &str, max_results: usize) -> Result<Vec<Paper>> {
        match &self.papers {
            Some(papers) => Ok(papers.iter().take(max_results).cloned().collect()),
            None => Err(Error::Fetch("search service unreachable".to_string())),
        }
    }
}

pub fn paper(arxiv_id: &str, title: &str, summary: &str) -> Paper {
    Paper {
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        summary: summary.to_string(),
        arxiv_id: arxiv_id.to_string(),
        published: Some("2024-01-02T03:04:05+00:00".to_string()),
        pdf_url: format!("http://arxiv.org/pdf/{}", arxiv_id),
        primary_category: "cs.LG".to_string(),
    }
}

pub fn sample_papers() -> Vec<Paper> {
    vec![
        paper(
            "2401.00001v1",
            "Denoising Diffusion Samplers",
            "Fast samplers for score based generative image synthesis.",
        ),
        paper(
            "2401.00002v1",
            "Graph Neural Networks for Molecules",
            "Message passing predicts chemical properties of proteins.",
        ),
        paper(
            "2401.00003v1",
            "Reinforcement Learning in Robotics",
            "Policy gradient agents control quadruped locomotion outdoors.",
        ),
    ]
}

pub async fn memory_store() -> (Arc<PaperStore>, Arc<MemoryIndex>) {
    let index = Arc::new(MemoryIndex::default());
    let store = Arc::new(PaperStore::new(index.clone(), Arc::new(HashEmbedder)));
    store.ensure_collection().await.unwrap();
    (store, index)
}

pub async fn memory_services(model: ScriptedModel) -> (Services, Arc<MemoryIndex>) {
    let (store, index) = memory_store().await;
    (Services::new(store, Arc::new(model)), index)
}
