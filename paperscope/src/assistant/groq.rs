use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// A hosted text-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GroqClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GroqClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, model: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": 0.7,
                "max_tokens": 1024
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("Groq returned {}: {}", status, body)));
        }

        let data = response.json::<Value>().await?;

        Ok(data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Llm("Failed to get content from response".to_string()))?
            .to_string())
    }
}
