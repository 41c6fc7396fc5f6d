use serde::{Deserialize, Serialize};

/// Unified error type for every remote service client in this crate.
///
/// Each variant carries a `provider` field naming the service that produced it
/// (`cloudflare`, `namecheap`, `openai`, `status_api`). All variants serialize
/// with a `code` tag for structured reporting.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError): connection refused, DNS failure, 5xx gateway errors
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
///
/// [`HttpUtils::execute_request_with_retry`](crate::HttpUtils::execute_request_with_retry)
/// retries these with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred.
    NetworkError {
        /// Service that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The credentials were rejected.
    InvalidCredentials {
        /// Service that produced the error.
        provider: String,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// The zone / domain does not exist on the remote side.
    DomainNotFound {
        /// Service that produced the error.
        provider: String,
        /// Domain name that was not found.
        domain: String,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected.
    InvalidParameter {
        /// Service that produced the error.
        provider: String,
        /// Parameter name.
        param: String,
        /// Details.
        detail: String,
    },

    /// Quota or billing limit reached.
    QuotaExceeded {
        /// Service that produced the error.
        provider: String,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// Rate limit exceeded.
    RateLimited {
        /// Service that produced the error.
        provider: String,
        /// Seconds to wait before retrying, if the service said so.
        retry_after: Option<u64>,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// The request timed out.
    Timeout {
        /// Service that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The caller lacks permission for the requested operation.
    PermissionDenied {
        /// Service that produced the error.
        provider: String,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// The response could not be parsed, or lacked an expected field.
    ParseError {
        /// Service that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// A request body could not be serialized.
    SerializationError {
        /// Service that produced the error.
        provider: String,
        /// Details.
        detail: String,
    },

    /// An unrecognized error returned by the service.
    Unknown {
        /// Service that produced the error.
        provider: String,
        /// Raw error code, if available.
        raw_code: Option<String>,
        /// Raw error message.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（凭证错误、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::DomainNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Name of the service that produced this error.
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Invalid credentials: {msg}"),
                None => write!(f, "[{provider}] Invalid credentials"),
            },
            Self::DomainNotFound {
                provider,
                domain,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Domain '{domain}' not found: {msg}"),
                None => write!(f, "[{provider}] Domain '{domain}' not found"),
            },
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { provider, .. } => {
                write!(f, "[{provider}] Quota exceeded")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => match retry_after {
                Some(secs) => write!(f, "[{provider}] Rate limited (retry after {secs}s)"),
                None => write!(f, "[{provider}] Rate limited"),
            },
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Permission denied: {msg}"),
                None => write!(f, "[{provider}] Permission denied"),
            },
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "status_api".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[status_api] Network error: connection refused");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "cloudflare".to_string(),
            raw_message: Some("bad key".to_string()),
        };
        assert_eq!(e.to_string(), "[cloudflare] Invalid credentials: bad key");
    }

    #[test]
    fn display_domain_not_found_without_message() {
        let e = ProviderError::DomainNotFound {
            provider: "cloudflare".to_string(),
            domain: "example.com".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[cloudflare] Domain 'example.com' not found");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            provider: "openai".to_string(),
            retry_after: Some(20),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[openai] Rate limited (retry after 20s)");
    }

    #[test]
    fn expected_errors_are_user_side() {
        let creds = ProviderError::InvalidCredentials {
            provider: "namecheap".to_string(),
            raw_message: None,
        };
        let timeout = ProviderError::Timeout {
            provider: "namecheap".to_string(),
            detail: "30s".to_string(),
        };
        assert!(creds.is_expected());
        assert!(!timeout.is_expected());
    }

    #[test]
    fn provider_accessor() {
        let e = ProviderError::ParseError {
            provider: "openai".to_string(),
            detail: "missing choices".to_string(),
        };
        assert_eq!(e.provider(), "openai");
    }

    #[test]
    fn serializes_with_code_tag() {
        let e = ProviderError::Timeout {
            provider: "cloudflare".to_string(),
            detail: "deadline".to_string(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "Timeout");
        assert_eq!(json["provider"], "cloudflare");
    }
}
