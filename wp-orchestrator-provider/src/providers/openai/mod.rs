//! OpenAI-compatible content generator

mod error;
mod http;
mod provider;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client_with_timeout;
use crate::types::GeneratorSettings;

/// Long-form completions regularly take longer than the default 30s.
pub(crate) const GENERATION_TIMEOUT_SECS: u64 = 180;
pub(crate) const MAX_RETRIES: u32 = 2;
pub(crate) const IMAGE_SIZE: &str = "1024x1024";

/// Content generator backed by the chat completions and image generation APIs.
pub struct OpenAiGenerator {
    pub(crate) client: Client,
    pub(crate) settings: GeneratorSettings,
}

impl OpenAiGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        Ok(Self {
            client: create_http_client_with_timeout(
                "openai",
                Duration::from_secs(GENERATION_TIMEOUT_SECS),
            )?,
            settings,
        })
    }
}
