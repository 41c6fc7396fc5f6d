//! Cloudflare HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse, MAX_PAGE_SIZE_RECORDS, MAX_RETRIES};

impl CloudflareProvider {
    /// 附加 `X-Auth-Email` / `X-Auth-Key` 认证头
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Auth-Email", &self.credentials.email)
            .header("X-Auth-Key", &self.credentials.api_key)
    }

    /// 发送请求并解析 Cloudflare 信封
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &str,
        path: &str,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let (status, text) = HttpUtils::execute_request_with_retry(
            self.authorized(builder),
            self.provider_name(),
            method,
            path,
            MAX_RETRIES,
        )
        .await?;

        let cf_response: CloudflareResponse<T> = match HttpUtils::parse_json(&text, self.provider_name()) {
            Ok(parsed) => parsed,
            Err(_) if !(200..300).contains(&status) => {
                return Err(HttpUtils::status_error(status, &text, self.provider_name()));
            }
            Err(e) => return Err(e),
        };

        if !cf_response.success {
            let raw = cf_response
                .errors
                .as_ref()
                .and_then(|errors| errors.first())
                .map_or_else(
                    || RawApiError::new(format!("request failed with HTTP {status}")),
                    |e| RawApiError::with_code(e.code.to_string(), e.message.clone()),
                );
            log::error!("[cloudflare] API 错误: {}", raw.message);
            return Err(self.map_error(raw, context));
        }

        Ok(cf_response)
    }

    /// 取出 `result` 字段
    fn take_result<T>(&self, response: CloudflareResponse<T>) -> Result<T> {
        response
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, context: ErrorContext) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let response = self.send(self.client.get(&url), "GET", path, context).await?;
        self.take_result(response)
    }

    /// 执行 GET 请求并翻页取回全部结果
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let paged = format!("{path}{separator}page={page}&per_page={MAX_PAGE_SIZE_RECORDS}");
            let url = format!("{CF_API_BASE}{paged}");
            let response: CloudflareResponse<Vec<T>> = self
                .send(self.client.get(&url), "GET", &paged, context.clone())
                .await?;

            let total_pages = response.result_info.as_ref().map_or(1, |i| i.total_pages);
            items.extend(response.result.unwrap_or_default());
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    /// 执行 POST 请求
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let response = self
            .send(self.client.post(&url).json(body), "POST", path, context)
            .await?;
        self.take_result(response)
    }

    /// 执行 PATCH 请求
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let response = self
            .send(self.client.patch(&url).json(body), "PATCH", path, context)
            .await?;
        self.take_result(response)
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{CF_API_BASE}{path}");
        let _: CloudflareResponse<serde_json::Value> =
            self.send(self.client.delete(&url), "DELETE", path, context).await?;
        Ok(())
    }
}
