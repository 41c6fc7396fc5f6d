//! Client for the system-of-record status endpoints
//!
//! Every call is a single `PATCH`; redelivery is the caller's job.

use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::providers::common::create_http_client;
use crate::types::{ServerStatusUpdate, SiteCredentialsUpdate, SiteStatusUpdate};

const PROVIDER: &str = "status_api";

/// HTTP client for the three status update endpoints.
pub struct StatusApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl StatusApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client(PROVIDER)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<()> {
        let mut request = self.client.patch(format!("{}{path}", self.base_url)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let (status, text) = HttpUtils::execute_request(request, PROVIDER, "PATCH", path).await?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(HttpUtils::status_error(status, &text, PROVIDER))
        }
    }

    /// `PATCH /server/change_status`
    pub async fn set_server_status(&self, update: &ServerStatusUpdate) -> Result<()> {
        self.patch("/server/change_status", update).await
    }

    /// `PATCH /domains/change_status`
    pub async fn set_site_status(&self, update: &SiteStatusUpdate) -> Result<()> {
        self.patch("/domains/change_status", update).await
    }

    /// `PATCH /domains/wp/add_creds`
    pub async fn set_site_credentials(&self, update: &SiteCredentialsUpdate) -> Result<()> {
        self.patch("/domains/wp/add_creds", update).await
    }
}
