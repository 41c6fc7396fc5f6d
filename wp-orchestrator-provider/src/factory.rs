//! Client factory functions.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::{ContentGenerator, Registrar, ZoneProvider};
use crate::types::{GeneratorSettings, RegistrarCredentials, ZoneCredentials};

#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;
#[cfg(feature = "namecheap")]
use crate::providers::NamecheapRegistrar;
#[cfg(feature = "openai")]
use crate::providers::OpenAiGenerator;

/// Creates a [`ZoneProvider`] bound to one zone account.
///
/// ```rust,no_run
/// use wp_orchestrator_provider::{create_zone_provider, ZoneCredentials};
///
/// let provider = create_zone_provider(ZoneCredentials {
///     email: "ops@example.com".to_string(),
///     api_key: "global-api-key".to_string(),
/// }).unwrap();
/// ```
#[cfg(feature = "cloudflare")]
pub fn create_zone_provider(credentials: ZoneCredentials) -> Result<Arc<dyn ZoneProvider>> {
    Ok(Arc::new(CloudflareProvider::new(credentials)?))
}

/// Creates a [`Registrar`] for one registrar account.
#[cfg(feature = "namecheap")]
pub fn create_registrar(credentials: RegistrarCredentials) -> Result<Arc<dyn Registrar>> {
    Ok(Arc::new(NamecheapRegistrar::new(credentials)?))
}

/// Creates the [`ContentGenerator`].
#[cfg(feature = "openai")]
pub fn create_content_generator(settings: GeneratorSettings) -> Result<Arc<dyn ContentGenerator>> {
    Ok(Arc::new(OpenAiGenerator::new(settings)?))
}
