//! Namecheap `Registrar` 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::providers::common::split_domain;
use crate::traits::{ErrorContext, ProviderErrorMapper, Registrar};
use crate::types::NameServers;

use super::response::{ApiOutcome, parse_api_response};
use super::{MAX_RETRIES, NamecheapRegistrar};

#[async_trait]
impl Registrar for NamecheapRegistrar {
    fn id(&self) -> &'static str {
        "namecheap"
    }

    async fn set_nameservers(&self, domain: &str, name_servers: &NameServers) -> Result<()> {
        let (sld, tld) = split_domain(domain, self.provider_name())?;
        let nameservers = name_servers.joined();
        let query = [
            ("ApiUser", self.credentials.username.as_str()),
            ("ApiKey", self.credentials.api_key.as_str()),
            ("UserName", self.credentials.username.as_str()),
            ("Command", "namecheap.domains.dns.setCustom"),
            ("ClientIp", self.credentials.client_ip.as_str()),
            ("SLD", sld.as_str()),
            ("TLD", tld.as_str()),
            ("Nameservers", nameservers.as_str()),
        ];

        let request = self.client.get(&self.api_url).query(&query);
        let (status, body) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            "namecheap.domains.dns.setCustom",
            MAX_RETRIES,
        )
        .await?;

        match parse_api_response(&body) {
            Some(ApiOutcome::Ok) => {
                log::info!("[namecheap] Nameservers of {domain} set to {nameservers}");
                Ok(())
            }
            Some(ApiOutcome::Error(parts)) => {
                log::error!("[namecheap] setCustom failed for {domain}: {}", parts.message);
                Err(self.map_error(parts.into(), ErrorContext::for_domain(domain)))
            }
            None => Err(HttpUtils::status_error(status, &body, self.provider_name())),
        }
    }
}
