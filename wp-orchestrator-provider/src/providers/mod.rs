//! Remote service clients

/// Shared utilities used by the clients.
pub mod common;

#[cfg(feature = "cloudflare")]
mod cloudflare;
#[cfg(feature = "namecheap")]
mod namecheap;
#[cfg(feature = "openai")]
mod openai;
mod status_api;

#[cfg(feature = "cloudflare")]
pub use cloudflare::CloudflareProvider;
#[cfg(feature = "namecheap")]
pub use namecheap::NamecheapRegistrar;
#[cfg(feature = "openai")]
pub use openai::OpenAiGenerator;
pub use status_api::StatusApiClient;
