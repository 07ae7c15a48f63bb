//! Fetch papers on a topic, store them, and answer a question.
//!
//! ```bash
//! pipeline --topic "diffusion models" --question "How are diffusion models trained?"
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use paperscope::{
    init, init_tracing,
    papers::ArxivClient,
    pipeline::run_pipeline,
    Configuration, Services,
};

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(about = "Fetch, store and answer questions about arXiv papers")]
struct Cli {
    /// Topic to search arXiv for
    #[arg(long)]
    topic: String,

    /// Question to answer from the stored papers
    #[arg(long)]
    question: String,

    /// Number of papers to fetch
    #[arg(long, default_value = "5")]
    max_results: usize,

    /// Number of stored papers to use as context
    #[arg(long, default_value = "3")]
    max_context: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    init_tracing();

    let cli = Cli::parse();
    let config = Configuration::from_env();
    if !config.is_configured() {
        bail!("Missing configuration: {}", config.missing_keys().join(", "));
    }

    let services = Services::connect(&config).await?;
    let source = ArxivClient::new();
    let report = run_pipeline(
        &source,
        &services,
        &cli.topic,
        &cli.question,
        cli.max_results,
        cli.max_context,
    )
    .await?;

    println!("Stored {} papers for topic: {}", report.stored, report.topic);
    println!("Answer: {}", report.response.answer);
    if let Some(error) = report.response.error {
        eprintln!("Error: {}", error);
    }
    Ok(())
}
