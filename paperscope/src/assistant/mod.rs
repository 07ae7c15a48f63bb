pub mod configuration;
pub mod groq;
pub mod prompts;
pub mod qa;
pub mod state;
