//! fetch -> store -> answer for a single topic and question.

use tracing::info;

use crate::assistant::state::QaResponse;
use crate::papers::PaperSource;
use crate::services::Services;
use crate::Result;

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub topic: String,
    pub fetched: usize,
    pub stored: usize,
    pub response: QaResponse,
}

/// Fetch and store papers for `topic`, then answer `question` from the
/// collection. Fetch and store failures abort the run; the answer step
/// always runs against whatever the collection holds, including papers from
/// earlier runs.
pub async fn run_pipeline(
    source: &dyn PaperSource,
    services: &Services,
    topic: &str,
    question: &str,
    max_results: usize,
    max_context: usize,
) -> Result<PipelineReport> {
    let papers = source.fetch(topic, max_results).await?;
    let stored = services.store.store(&papers).await?;
    info!("Stored {} papers for topic: {}", stored, topic);

    let response = services.qa.answer(question, max_context).await;

    Ok(PipelineReport {
        topic: topic.to_string(),
        fetched: papers.len(),
        stored,
        response,
    })
}
