//! DNS 路由服务
//!
//! 区域创建、NS 委派、A 记录指向与 SSL 模式。

use std::sync::Arc;

use wp_orchestrator_provider::{CreateARecordRequest, ProviderError, Zone, ZoneProvider, ZoneStatus};

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{NameServers, RegistrarCredentials, SslMode, ZoneCredentials};

/// Relative names every site gets an A record for.
const SITE_RECORD_NAMES: &[&str] = &["@", "www"];

pub struct DnsRoutingService {
    ctx: Arc<ServiceContext>,
}

impl DnsRoutingService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create the zone and, with a registrar account, delegate the domain to it.
    pub async fn attach_domain(
        &self,
        account: &ZoneCredentials,
        domain: &str,
        registrar: Option<&RegistrarCredentials>,
    ) -> CoreResult<NameServers> {
        let zones = self.ctx.dns.zone_provider(account)?;
        let name_servers = zones.create_zone(domain).await?;
        log::info!(
            "[{domain}] Zone created, nameservers {}",
            name_servers.joined()
        );

        if let Some(credentials) = registrar {
            self.ctx
                .dns
                .registrar(credentials)?
                .set_nameservers(domain, &name_servers)
                .await?;
            log::info!("[{domain}] Nameservers delegated at the registrar");
        }
        Ok(name_servers)
    }

    /// Point the domain at `server_ip` once its zone is active.
    ///
    /// Returns `false` without touching anything while the zone is still pending.
    pub async fn point_when_active(
        &self,
        account: &ZoneCredentials,
        domain: &str,
        server_ip: &str,
    ) -> CoreResult<bool> {
        let zones = self.ctx.dns.zone_provider(account)?;
        let zone = require_zone(zones.as_ref(), domain).await?;
        if zone.status != ZoneStatus::Active {
            log::info!("[{domain}] Zone is {:?}, not pointing yet", zone.status);
            return Ok(false);
        }

        replace_a_records(zones.as_ref(), &zone, server_ip).await?;
        Ok(true)
    }

    /// Move the domain to a new server: replace its A records and set the SSL mode.
    ///
    /// Used before a transfer with `flexible`, and with `full` once the
    /// destination has its certificate.
    pub async fn repoint(
        &self,
        account: &ZoneCredentials,
        domain: &str,
        new_ip: &str,
        ssl_mode: SslMode,
    ) -> CoreResult<()> {
        let zones = self.ctx.dns.zone_provider(account)?;
        let zone = require_zone(zones.as_ref(), domain).await?;
        replace_a_records(zones.as_ref(), &zone, new_ip).await?;
        zones.set_ssl_mode(&zone.id, ssl_mode).await?;
        log::info!("[{domain}] SSL mode set to {}", ssl_mode.as_str());
        Ok(())
    }

    pub async fn set_ssl_mode(
        &self,
        account: &ZoneCredentials,
        domain: &str,
        mode: SslMode,
    ) -> CoreResult<()> {
        let zones = self.ctx.dns.zone_provider(account)?;
        let zone = require_zone(zones.as_ref(), domain).await?;
        zones.set_ssl_mode(&zone.id, mode).await?;
        Ok(())
    }
}

async fn require_zone(zones: &dyn ZoneProvider, domain: &str) -> CoreResult<Zone> {
    zones.find_zone(domain).await?.ok_or_else(|| {
        ProviderError::DomainNotFound {
            provider: zones.id().to_string(),
            domain: domain.to_string(),
            raw_message: None,
        }
        .into()
    })
}

async fn replace_a_records(zones: &dyn ZoneProvider, zone: &Zone, address: &str) -> CoreResult<()> {
    let deleted = zones.delete_all_records(&zone.id).await?;
    for name in SITE_RECORD_NAMES {
        zones
            .create_a_record(
                &zone.id,
                &CreateARecordRequest {
                    name: (*name).to_string(),
                    address: address.to_string(),
                    proxied: true,
                },
            )
            .await?;
    }
    log::info!(
        "[{}] {deleted} records replaced by A records to {address}",
        zone.name
    );
    Ok(())
}
