//! OpenAI `ContentGenerator` 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ContentGenerator, ProviderErrorMapper};
use crate::types::GeneratedPost;

use super::types::{ChatRequest, ChatResponse, ImageRequest, ImageResponse};
use super::{IMAGE_SIZE, OpenAiGenerator};

const WRITER_ROLE: &str = "You are a skilled blog writer.";
const POST_WRITER_ROLE: &str = "You are a blog writer.";

/// Strip whitespace and the quotes/markdown emphasis models like to wrap
/// single-line answers in.
pub(crate) fn clean_line(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '*' | '#' | '“' | '”'))
        .trim()
        .to_string()
}

impl OpenAiGenerator {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response: ChatResponse = self.post_json("/chat/completions", request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| self.parse_error("completion returned no content"))
    }

    async fn generate_image(&self, keyword: &str) -> Result<String> {
        let prompt = format!("Generate an image that represents the concept of {keyword}.");
        let request = ImageRequest {
            model: &self.settings.image_model,
            prompt: &prompt,
            n: 1,
            size: IMAGE_SIZE,
        };
        let response: ImageResponse = self.post_json("/images/generations", &request).await?;
        response
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or_else(|| self.parse_error("image generation returned no url"))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate_topic(&self, keyword: &str) -> Result<String> {
        let prompt = format!(
            "Generate a new topic based on the theme: {keyword}. Provide only the new topic and \
             nothing else. Avoid any topics related to AI or artificial intelligence."
        );
        let mut request = ChatRequest::new(&self.settings.text_model, Some(WRITER_ROLE), &prompt);
        request.max_tokens = Some(50);
        request.temperature = Some(0.7);
        Ok(clean_line(&self.complete(&request).await?))
    }

    async fn generate_post(&self, keyword: &str) -> Result<GeneratedPost> {
        let topic = self.generate_topic(keyword).await?;
        let prompt = format!(
            "Write a natural-sounding detailed blog post about {topic}. Include personal \
             anecdotes, real-life examples, and use conversational language. Vary the sentence \
             structure and keep the writing less repetitive. Incorporate informal phrases, \
             contractions, and occasional interjections. Write in simpler language and avoid \
             complex terms and abbreviations. Avoid any content related to AI or artificial \
             intelligence."
        );
        let mut request =
            ChatRequest::new(&self.settings.text_model, Some(POST_WRITER_ROLE), &prompt);
        request.max_tokens = Some(4096);
        request.temperature = Some(0.75);
        request.top_p = Some(0.9);
        request.frequency_penalty = Some(0.6);
        request.presence_penalty = Some(0.7);
        let body = self.complete(&request).await?;

        let image_url = self.generate_image(keyword).await?;

        Ok(GeneratedPost {
            title: topic,
            body,
            image_url,
        })
    }

    async fn generate_title(&self, keyword: &str) -> Result<String> {
        let prompt = format!("Generate a catchy title for a sales form with the keyword: {keyword}");
        let request = ChatRequest::new(&self.settings.text_model, Some(WRITER_ROLE), &prompt);
        Ok(clean_line(&self.complete(&request).await?))
    }

    async fn generate_address(&self) -> Result<String> {
        let prompt = "Generate a random, realistic address located in the United States. \
                      Provide only the new address and nothing else.";
        let request = ChatRequest::new(&self.settings.text_model, None, prompt);
        Ok(clean_line(&self.complete(&request).await?))
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        HttpUtils::execute_download(self.client.get(url), self.provider_name(), url).await
    }
}
