//! OpenAI HTTP 请求方法

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::types::ErrorEnvelope;
use super::{MAX_RETRIES, OpenAiGenerator};

impl OpenAiGenerator {
    /// 执行 POST 请求（Bearer 认证）
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{path}", self.settings.base_url.trim_end_matches('/'));
        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(body);

        let (status, text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "POST",
            path,
            MAX_RETRIES,
        )
        .await?;

        if (200..300).contains(&status) {
            return HttpUtils::parse_json(&text, self.provider_name());
        }

        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => {
                let error = envelope.error;
                log::warn!(
                    "[openai] {} ({}): {}",
                    error.error_type.as_deref().unwrap_or("error"),
                    status,
                    error.message
                );
                let code = error.code.unwrap_or_else(|| status.to_string());
                Err(self.map_error(
                    RawApiError::with_code(code, error.message),
                    ErrorContext::default(),
                ))
            }
            Err(_) => Err(HttpUtils::status_error(status, &text, self.provider_name())),
        }
    }
}
