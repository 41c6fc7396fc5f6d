//! 服务客户端公共工具函数

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(provider: &str) -> Result<Client> {
    create_http_client_with_timeout(provider, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
}

/// 创建自定义请求超时的 HTTP Client（长文本生成需要更长的超时）
pub fn create_http_client_with_timeout(provider: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("failed to build HTTP client: {e}"),
        })
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点并转小写
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// 拆分为二级域名与顶级域名
/// 如: "example.com" -> ("example", "com")
/// 如: "example.co.uk" -> ("example", "co.uk")
pub fn split_domain(domain: &str, provider: &str) -> Result<(String, String)> {
    let domain = normalize_domain_name(domain);
    match domain.split_once('.') {
        Some((sld, tld)) if !sld.is_empty() && !tld.is_empty() => {
            Ok((sld.to_string(), tld.to_string()))
        }
        _ => Err(ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "domain".to_string(),
            detail: format!("not a registrable domain: {domain}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_dot() {
        assert_eq!(normalize_domain_name("Example.com."), "example.com");
    }

    #[test]
    fn split_simple_and_compound_tld() {
        assert_eq!(
            split_domain("example.com", "namecheap").unwrap(),
            ("example".to_string(), "com".to_string())
        );
        assert_eq!(
            split_domain("shop.co.uk", "namecheap").unwrap(),
            ("shop".to_string(), "co.uk".to_string())
        );
    }

    #[test]
    fn split_rejects_bare_label() {
        assert!(matches!(
            split_domain("localhost", "namecheap"),
            Err(ProviderError::InvalidParameter { .. })
        ));
    }
}
