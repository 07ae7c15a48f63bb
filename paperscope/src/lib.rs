//! PaperScope - question answering over recent arXiv papers
//!
//! ```text
//! topic -> arXiv -> Paper records -> Embedder -> Qdrant
//!                                                  |
//! question -> Embedder -> similarity search <------+
//!                               |
//!                   context block + prompt -> Groq -> answer
//! ```

pub mod assistant;
pub mod embedding;
pub mod error;
pub mod papers;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod storage;

pub use assistant::configuration::Configuration;
pub use assistant::qa::QaSystem;
pub use error::{Error, Result};
pub use services::Services;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

pub fn init() {
    dotenv().ok();
}

/// Install the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
