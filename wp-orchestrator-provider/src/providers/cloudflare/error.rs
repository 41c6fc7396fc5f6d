//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// Cloudflare error code mapping
/// Reference: <https://api.cloudflare.com/#getting-started-responses>
impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // 6003: Invalid request headers
            // 6103: Invalid format for X-Auth-Key header
            // 9103: Unknown X-Auth-Key or X-Auth-Email
            // 9109: Unauthorized to access requested resource
            // 10000: Authentication error
            Some("6003" | "6103" | "9103" | "9109" | "10000") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // 1049: not a registered domain
            // 1061: zone already exists
            // 1099: domain is not allowed on this plan
            Some(code @ ("1049" | "1061" | "1099")) => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: if code == "1061" { "zone" } else { "domain" }.to_string(),
                detail: raw.message,
            },

            // 9005: Content for A record is invalid
            Some("9005") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "content".to_string(),
                detail: raw.message,
            },

            // 1105: zone limit reached
            // 81045: record quota exceeded
            Some("1105" | "81045") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 1001: invalid zone identifier
            // 7000: No route for that URI
            // 7003: Could not route to /path
            Some("1001" | "7000" | "7003") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 1068: permission denied for this zone
            Some("1068") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}
