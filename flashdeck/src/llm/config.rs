//! Completion provider configuration.

use std::time::Duration;

/// Completion provider configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completions endpoint
    pub api_url: String,

    /// Bearer token sent to the provider
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Upper bound on one provider call, in seconds
    pub timeout_secs: u64,

    /// Maximum completion length in tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling cutoff
    pub top_p: f32,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "deepseek-r1-distill-qwen-32b".to_string(),
            timeout_secs: 60,
            max_tokens: 4096,
            temperature: 0.6,
            top_p: 0.95,
        }
    }
}
