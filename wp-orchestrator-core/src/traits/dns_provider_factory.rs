//! DNS provider factory Trait

use std::sync::Arc;

use wp_orchestrator_provider::{
    create_registrar, create_zone_provider, Registrar, RegistrarCredentials, ZoneCredentials,
    ZoneProvider,
};

use crate::error::CoreResult;

/// Builds clients for the zone and registrar accounts carried by an invocation.
pub trait DnsProviderFactory: Send + Sync {
    fn zone_provider(&self, credentials: &ZoneCredentials) -> CoreResult<Arc<dyn ZoneProvider>>;

    fn registrar(&self, credentials: &RegistrarCredentials) -> CoreResult<Arc<dyn Registrar>>;
}

/// Factory for the real HTTP clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDnsProviderFactory;

impl DnsProviderFactory for HttpDnsProviderFactory {
    fn zone_provider(&self, credentials: &ZoneCredentials) -> CoreResult<Arc<dyn ZoneProvider>> {
        Ok(create_zone_provider(credentials.clone())?)
    }

    fn registrar(&self, credentials: &RegistrarCredentials) -> CoreResult<Arc<dyn Registrar>> {
        Ok(create_registrar(credentials.clone())?)
    }
}
