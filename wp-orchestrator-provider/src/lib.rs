//! # wp-orchestrator-provider
//!
//! HTTP clients for the remote services the provisioning engine talks to.
//!
//! | Service | Trait | Feature Flag | Auth Method |
//! |---------|-------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | [`ZoneProvider`] | `cloudflare` | `X-Auth-Email` / `X-Auth-Key` |
//! | [Namecheap](https://www.namecheap.com/support/api/) | [`Registrar`] | `namecheap` | API user + key + whitelisted IP |
//! | OpenAI-compatible API | [`ContentGenerator`] | `openai` | Bearer token |
//! | Status API | [`StatusApiClient`] | always | optional Bearer token |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable every client above.
//! - **`rustls`** *(default)* / **`native-tls`**: TLS backend.
//!
//! ## Error Handling
//!
//! Every call returns [`Result<T, ProviderError>`](ProviderError). Transient
//! errors (`NetworkError`, `Timeout`, `RateLimited`) are retried with
//! exponential backoff by [`HttpUtils::execute_request_with_retry`]; the
//! status API client sends once and leaves redelivery to its caller.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

#[cfg(feature = "namecheap")]
pub use factory::create_registrar;
#[cfg(feature = "openai")]
pub use factory::create_content_generator;
#[cfg(feature = "cloudflare")]
pub use factory::create_zone_provider;

pub use http_client::{HttpUtils, backoff_delay, is_retryable};

pub use traits::{ContentGenerator, Registrar, ZoneProvider};

pub use types::{
    CreateARecordRequest, DnsRecord, GeneratedPost, GeneratorSettings, NameServers,
    RegistrarCredentials, ServerStatusUpdate, SiteCredentialsUpdate, SiteStatusUpdate, SslMode,
    Zone, ZoneCredentials, ZoneStatus,
};

pub use utils::log_sanitizer::{mask_secret, truncate_for_log};

#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
#[cfg(feature = "namecheap")]
pub use providers::NamecheapRegistrar;
#[cfg(feature = "openai")]
pub use providers::OpenAiGenerator;
pub use providers::StatusApiClient;
