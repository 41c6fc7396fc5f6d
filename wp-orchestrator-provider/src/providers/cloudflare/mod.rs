//! Cloudflare zone provider

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::types::ZoneCredentials;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;
/// 瞬时错误的最大重试次数
pub(crate) const MAX_RETRIES: u32 = 3;

/// Cloudflare zone provider bound to one account (global API key auth).
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) credentials: ZoneCredentials,
}

impl CloudflareProvider {
    pub fn new(credentials: ZoneCredentials) -> Result<Self> {
        Ok(Self {
            client: create_http_client("cloudflare")?,
            credentials,
        })
    }
}
