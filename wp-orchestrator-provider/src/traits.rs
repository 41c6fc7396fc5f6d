use async_trait::async_trait;
use futures::future::join_all;

use crate::error::{ProviderError, Result};
use crate::types::{
    CreateARecordRequest, DnsRecord, GeneratedPost, NameServers, SslMode, Zone,
};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各服务格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 域名（用于 `DomainNotFound` 等错误）
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            domain: Some(domain.to_string()),
        }
    }
}

/// 服务错误映射 Trait（内部使用）
pub(crate) trait ProviderErrorMapper {
    /// 服务标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS zone provider.
///
/// One instance is bound to one zone account's credentials.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Provider identifier (`cloudflare`).
    fn id(&self) -> &'static str;

    /// Create a zone for an apex domain and return its nameserver pair.
    ///
    /// Fails with `ParseError` when the provider assigns fewer than two nameservers.
    async fn create_zone(&self, domain: &str) -> Result<NameServers>;

    /// Look up a zone by apex domain.
    async fn find_zone(&self, domain: &str) -> Result<Option<Zone>>;

    /// List every record of a zone.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    async fn create_a_record(&self, zone_id: &str, req: &CreateARecordRequest)
    -> Result<DnsRecord>;

    /// Set the zone's edge SSL mode.
    async fn set_ssl_mode(&self, zone_id: &str, mode: SslMode) -> Result<()>;

    /// Delete every record in a zone.
    ///
    /// Deletions run concurrently; the first failure is returned after all
    /// requests finished. Returns the number of deleted records.
    async fn delete_all_records(&self, zone_id: &str) -> Result<usize> {
        let records = self.list_records(zone_id).await?;
        let results = join_all(
            records
                .iter()
                .map(|record| self.delete_record(zone_id, &record.id)),
        )
        .await;

        let mut deleted = 0;
        let mut first_error = None;
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => {
                    log::warn!("[{}] Failed to delete record {}: {e}", self.id(), record.name);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }
}

/// Domain registrar (nameserver delegation).
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Registrar identifier (`namecheap`).
    fn id(&self) -> &'static str;

    /// Point the domain at custom nameservers.
    async fn set_nameservers(&self, domain: &str, name_servers: &NameServers) -> Result<()>;
}

/// Generative text / image API.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// A fresh article topic derived from a keyword.
    async fn generate_topic(&self, keyword: &str) -> Result<String>;

    /// Topic, article body and an image URL for one post.
    async fn generate_post(&self, keyword: &str) -> Result<GeneratedPost>;

    /// A catchy title containing the keyword, used as the site title.
    async fn generate_title(&self, keyword: &str) -> Result<String>;

    /// A random, realistic postal address.
    async fn generate_address(&self) -> Result<String>;

    /// Fetch a generated image.
    async fn download_image(&self, url: &str) -> Result<Vec<u8>>;
}
