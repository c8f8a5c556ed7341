//! Prompt construction and the single provider call per generation.

use std::{sync::Arc, time::Duration};

use serde_json::json;

use super::errors::{DeckError, DeckResult};
use crate::llm::{CompletionProvider, CompletionRequest, LlmConfig, LlmError, ResponseFormat};

/// Asks the completion provider for a deck on a topic
///
/// Each call to [`generate`](Self::generate) makes exactly one provider request. Nothing
/// is retried or cached, and the returned text is not inspected.
pub struct DeckGenerator {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl DeckGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            timeout: config.timeout(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    /// Override the provider timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the completion request for a topic
    pub fn request_for(&self, topic: &str) -> CompletionRequest {
        CompletionRequest {
            system: system_prompt(),
            user: user_prompt(topic),
            response_format: ResponseFormat::JsonObject,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Request a deck about `topic` and return the raw provider text
    ///
    /// # Errors
    ///
    /// - `DeckError::InvalidInput` - Topic is blank; the provider is not called
    /// - `DeckError::GenerationFailure` - Provider error, empty content, or timeout
    pub async fn generate(&self, topic: &str) -> DeckResult<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DeckError::InvalidInput("Topic must not be empty".to_string()));
        }

        let request = self.request_for(topic);
        let outcome = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .await
            .unwrap_or(Err(LlmError::Timeout(self.timeout)));

        match outcome {
            Ok(content) => {
                log::info!(
                    "Received {} bytes of generated content for topic {:?}",
                    content.len(),
                    topic
                );
                Ok(content)
            }
            Err(e) => {
                log::error!("Deck generation for topic {:?} failed: {}", topic, e);
                Err(DeckError::GenerationFailure(e.to_string()))
            }
        }
    }
}

fn system_prompt() -> String {
    let sample = json!({
        "title": "Concise deck title (3-7 words)",
        "description": "1-sentence overview of the deck's focus",
        "cards": [{
            "question": "Clear, specific question",
            "answer": "Succinct but complete answer",
            "explanation": "1-2 sentences connecting concepts"
        }]
    });

    format!(
        "You are an expert educational tutor who builds structured flashcard decks. \
         Respond with valid JSON only, following these rules:\n\
         \n\
         1. Output format:\n\
         - Always return JSON with exactly this structure:\n\
         {sample:#}\n\
         \n\
         2. Educational practice:\n\
         - Favor conceptual understanding over memorization\n\
         - Address common student misconceptions in explanations\n\
         - Use language suited to the audience level\n\
         \n\
         3. Format constraints:\n\
         - Never use markdown or write anything outside the JSON\n\
         - Keep the JSON syntax exact (quotes, commas, brackets)\n\
         - Escape special characters such as \\n or \\\\\n"
    )
}

fn user_prompt(topic: &str) -> String {
    format!(
        "Create a comprehensive flashcard deck about {topic}. Guidelines:\n\
         - Generate 5-8 cards covering fundamental concepts\n\
         - Example for \"Photosynthesis\":\n\
         \x20 Question: \"What is the primary role of chlorophyll?\"\n\
         \x20 Answer: \"Absorb light energy for photosynthesis\"\n\
         \x20 Explanation: \"Chlorophyll captures blue and red wavelengths while reflecting green light.\"\n"
    )
}
