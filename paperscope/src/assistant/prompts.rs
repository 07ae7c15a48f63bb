use crate::papers::ScoredPaper;

pub const QA_PROMPT: &str = r#"You are a helpful assistant that can answer questions about the following context:
{context}

Question: {question}
Answer:"#;

pub const NO_PAPERS: &str = "No papers";

pub fn format_qa_prompt(context: &str, question: &str) -> String {
    QA_PROMPT
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Render retrieved papers as numbered blocks separated by blank lines.
pub fn format_context(papers: &[ScoredPaper]) -> String {
    if papers.is_empty() {
        return NO_PAPERS.to_string();
    }

    papers
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let paper = &scored.paper;
            format!(
                "Paper {}:\nTitle: {}\nAuthors: {}\narxiv_id: {}\nCategory: {}\nSummary: {}",
                i + 1,
                paper.title,
                paper.authors.join(", "),
                paper.arxiv_id,
                paper.primary_category,
                paper.summary
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n")
}
