use std::sync::Arc;

use tracing::{error, info, warn};

use super::configuration::Configuration;
use super::groq::{GroqClient, LanguageModel};
use super::prompts::{format_context, format_qa_prompt};
use super::state::QaResponse;
use crate::papers::ScoredPaper;
use crate::storage::PaperStore;
use crate::{Error, Result};

pub const NO_RELEVANT_PAPERS: &str = "No relevant papers found";
pub const ANSWER_FAILED: &str = "An error occurred while answering the question";

/// Retrieval-augmented question answering over the paper store.
pub struct QaSystem {
    store: Arc<PaperStore>,
    llm: Arc<dyn LanguageModel>,
}

impl QaSystem {
    pub fn new(store: Arc<PaperStore>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { store, llm }
    }

    /// Build the Groq-backed engine. Refuses to start without the full
    /// configuration.
    pub fn connect(config: &Configuration, store: Arc<PaperStore>) -> Result<Self> {
        let api_key = match (&config.groq_api_key, config.is_configured()) {
            (Some(key), true) => key.clone(),
            _ => return Err(Error::NotConfigured("Config is not configured".to_string())),
        };
        let llm = GroqClient::new(api_key, config.groq_model.clone());
        Ok(Self::new(store, Arc::new(llm)))
    }

    /// Answer `question` from at most `max_context` stored papers. Never
    /// fails: errors are reported in the response.
    pub async fn answer(&self, question: &str, max_context: usize) -> QaResponse {
        match self.try_answer(question, max_context).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to answer question: {}", e);
                QaResponse::fixed(ANSWER_FAILED, Some(e.to_string()))
            }
        }
    }

    async fn try_answer(&self, question: &str, max_context: usize) -> Result<QaResponse> {
        let context_papers = self.store.search(question, max_context).await;
        if context_papers.is_empty() {
            return Ok(QaResponse::fixed(NO_RELEVANT_PAPERS, None));
        }

        let context = format_context(&context_papers);
        let prompt = format_qa_prompt(&context, question);
        let answer = self.llm.generate(&prompt).await?;

        info!("Answered question using {} papers", context_papers.len());
        Ok(QaResponse::answered(answer, context_papers))
    }

    /// Retrieval only, without calling the model.
    pub async fn context_for(&self, question: &str, limit: usize) -> Vec<ScoredPaper> {
        self.store.search(question, limit).await
    }

    /// Round-trip a trivial prompt to check the model is reachable.
    pub async fn test_connection(&self) -> bool {
        match self.llm.generate("Say 'Hello' if you can hear me.").await {
            Ok(reply) => reply.contains("Hello"),
            Err(e) => {
                warn!("Connection failed: {}", e);
                false
            }
        }
    }
}
