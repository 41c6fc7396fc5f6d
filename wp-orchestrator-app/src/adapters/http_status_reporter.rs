//! Status reporter backed by the status API.

use async_trait::async_trait;
use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::traits::StatusReporter;
use wp_orchestrator_core::types::{CompletedStep, ServerStatus, SiteStatus};
use wp_orchestrator_provider::{
    ProviderError, ServerStatusUpdate, SiteCredentialsUpdate, SiteStatusUpdate, StatusApiClient,
};

/// One `PATCH` per call, no retries. Wrap it in a `StatusOutbox` for redelivery.
pub struct HttpStatusReporter {
    client: StatusApiClient,
}

impl HttpStatusReporter {
    #[must_use]
    pub fn new(client: StatusApiClient) -> Self {
        Self { client }
    }
}

fn site_update(domain: &str, status: SiteStatus, step: Option<CompletedStep>) -> SiteStatusUpdate {
    SiteStatusUpdate {
        domain: domain.to_string(),
        status: status.as_str().to_string(),
        complete_step: step.map(|s| s.as_str().to_string()),
        cleared_steps: step
            .map(|s| s.invalidates().iter().map(|c| c.as_str().to_string()).collect())
            .unwrap_or_default(),
    }
}

fn reporting_error(e: ProviderError) -> CoreError {
    CoreError::Reporting(e.to_string())
}

#[async_trait]
impl StatusReporter for HttpStatusReporter {
    async fn set_server_status(&self, server: &str, status: ServerStatus) -> CoreResult<()> {
        self.client
            .set_server_status(&ServerStatusUpdate {
                server_ip: server.to_string(),
                status: status.as_str().to_string(),
            })
            .await
            .map_err(reporting_error)
    }

    async fn set_site_status(
        &self,
        domain: &str,
        status: SiteStatus,
        step: Option<CompletedStep>,
    ) -> CoreResult<()> {
        self.client
            .set_site_status(&site_update(domain, status, step))
            .await
            .map_err(reporting_error)
    }

    async fn set_site_credentials(
        &self,
        domain: &str,
        login: &str,
        password: &str,
    ) -> CoreResult<()> {
        self.client
            .set_site_credentials(&SiteCredentialsUpdate {
                domain: domain.to_string(),
                login: login.to_string(),
                password: password.to_string(),
            })
            .await
            .map_err(reporting_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_change_clears_contact_form() {
        let update = site_update("a.com", SiteStatus::Done, Some(CompletedStep::ThemeChanged));
        assert_eq!(update.complete_step.as_deref(), Some("theme_changed"));
        assert_eq!(update.cleared_steps, vec!["form_added".to_string()]);
    }

    #[test]
    fn plain_status_has_no_step() {
        let update = site_update("a.com", SiteStatus::Configuring, None);
        assert_eq!(update.status, "configure");
        assert!(update.complete_step.is_none());
        assert!(update.cleared_steps.is_empty());
    }
}
