//! Cloudflare `ZoneProvider` 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{ErrorContext, ProviderErrorMapper, ZoneProvider};
use crate::types::{CreateARecordRequest, DnsRecord, NameServers, SslMode, Zone, ZoneStatus};

use super::types::{CreateRecordBody, CreateZoneBody, SettingValueBody};
use super::{CloudflareDnsRecord, CloudflareProvider, CloudflareZone};

impl CloudflareProvider {
    pub(crate) fn zone_status(status: &str) -> ZoneStatus {
        match status {
            "active" => ZoneStatus::Active,
            "pending" | "initializing" => ZoneStatus::Pending,
            "moved" | "deleted" => ZoneStatus::Moved,
            _ => ZoneStatus::Unknown,
        }
    }

    pub(crate) fn to_zone(zone: CloudflareZone) -> Zone {
        Zone {
            status: Self::zone_status(&zone.status),
            id: zone.id,
            name: zone.name,
            name_servers: zone.name_servers,
        }
    }

    pub(crate) fn to_record(record: CloudflareDnsRecord) -> DnsRecord {
        DnsRecord {
            id: record.id,
            name: record.name,
            record_type: record.record_type,
            content: record.content,
            proxied: record.proxied.unwrap_or(false),
        }
    }
}

#[async_trait]
impl ZoneProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn create_zone(&self, domain: &str) -> Result<NameServers> {
        let body = CreateZoneBody {
            name: domain,
            jump_start: true,
        };
        let zone: CloudflareZone = self
            .post("/zones", &body, ErrorContext::for_domain(domain))
            .await?;

        log::info!("[cloudflare] Zone created for {domain}: {:?}", zone.name_servers);
        NameServers::from_list(&zone.name_servers).ok_or_else(|| {
            self.parse_error(format!(
                "expected two nameservers for {domain}, got {}",
                zone.name_servers.len()
            ))
        })
    }

    async fn find_zone(&self, domain: &str) -> Result<Option<Zone>> {
        let path = format!("/zones?name={}", urlencoding::encode(domain));
        let zones: Vec<CloudflareZone> = self.get(&path, ErrorContext::for_domain(domain)).await?;
        Ok(zones.into_iter().next().map(Self::to_zone))
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let path = format!("/zones/{zone_id}/dns_records");
        let records: Vec<CloudflareDnsRecord> =
            self.get_all_pages(&path, ErrorContext::default()).await?;
        Ok(records.into_iter().map(Self::to_record).collect())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let path = format!("/zones/{zone_id}/dns_records/{record_id}");
        self.delete(&path, ErrorContext::default()).await
    }

    async fn create_a_record(
        &self,
        zone_id: &str,
        req: &CreateARecordRequest,
    ) -> Result<DnsRecord> {
        let path = format!("/zones/{zone_id}/dns_records");
        let body = CreateRecordBody {
            record_type: "A",
            name: &req.name,
            content: &req.address,
            ttl: 1,
            proxied: req.proxied,
        };
        let record: CloudflareDnsRecord =
            self.post(&path, &body, ErrorContext::default()).await?;
        Ok(Self::to_record(record))
    }

    async fn set_ssl_mode(&self, zone_id: &str, mode: SslMode) -> Result<()> {
        let path = format!("/zones/{zone_id}/settings/ssl");
        let body = SettingValueBody {
            value: mode.as_str(),
        };
        let _: serde_json::Value = self.patch(&path, &body, ErrorContext::default()).await?;
        log::info!("[cloudflare] SSL mode of zone {zone_id} set to {}", mode.as_str());
        Ok(())
    }
}
