//! Namecheap registrar

mod error;
mod provider;
mod response;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::types::RegistrarCredentials;

pub(crate) const NAMECHEAP_API_URL: &str = "https://api.namecheap.com/xml.response";
pub(crate) const MAX_RETRIES: u32 = 2;

/// Namecheap registrar client.
pub struct NamecheapRegistrar {
    pub(crate) client: Client,
    pub(crate) credentials: RegistrarCredentials,
    pub(crate) api_url: String,
}

impl NamecheapRegistrar {
    pub fn new(credentials: RegistrarCredentials) -> Result<Self> {
        Ok(Self {
            client: create_http_client("namecheap")?,
            credentials,
            api_url: NAMECHEAP_API_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (sandbox API).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
