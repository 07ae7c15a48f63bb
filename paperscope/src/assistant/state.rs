use serde::{Deserialize, Serialize};

use crate::papers::ScoredPaper;

pub const DEFAULT_MAX_CONTEXT: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct QaRequest {
    pub question: String,
    #[serde(default = "default_max_context")]
    pub max_context: usize,
}

fn default_max_context() -> usize {
    DEFAULT_MAX_CONTEXT
}

/// Outcome of answering a question. Failures are carried in `error`
/// rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaResponse {
    pub answer: String,
    pub sources: Vec<ScoredPaper>,
    pub context_used: usize,
    pub error: Option<String>,
}

impl QaResponse {
    pub fn answered(answer: String, sources: Vec<ScoredPaper>) -> Self {
        Self {
            answer,
            context_used: sources.len(),
            sources,
            error: None,
        }
    }

    pub fn fixed(answer: &str, error: Option<String>) -> Self {
        Self {
            answer: answer.to_string(),
            sources: Vec::new(),
            context_used: 0,
            error,
        }
    }
}
