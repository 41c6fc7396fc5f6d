//! OpenAI error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::OpenAiGenerator;

impl ProviderErrorMapper for OpenAiGenerator {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn map_error(&self, raw: RawApiError, _context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            Some("invalid_api_key" | "401") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },
            Some("insufficient_quota" | "billing_hard_limit_reached") => {
                ProviderError::QuotaExceeded {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }
            Some("content_policy_violation" | "context_length_exceeded" | "400") => {
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: "prompt".to_string(),
                    detail: raw.message,
                }
            }
            Some("model_not_found" | "403") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },
            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeneratorSettings;

    fn generator() -> OpenAiGenerator {
        OpenAiGenerator::new(GeneratorSettings::default()).unwrap()
    }

    #[test]
    fn quota_codes() {
        let err = generator().map_error(
            RawApiError::with_code("insufficient_quota", "You exceeded your current quota"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::QuotaExceeded { .. }));
    }

    #[test]
    fn policy_violation_is_parameter_error() {
        let err = generator().map_error(
            RawApiError::with_code("content_policy_violation", "rejected"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "prompt"
        ));
    }
}
