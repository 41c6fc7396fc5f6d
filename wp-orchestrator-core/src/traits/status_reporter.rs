//! Status reporting abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{CompletedStep, ServerStatus, SiteStatus};

/// Pushes status changes to the system of record.
///
/// Every update is a "set to X", so redelivering one is harmless.
///
/// Implementations:
/// - `HttpStatusReporter` (app crate): one `PATCH` per call
/// - `StatusOutbox`: queues updates and redelivers them through another reporter
#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn set_server_status(&self, server: &str, status: ServerStatus) -> CoreResult<()>;

    /// `step` marks a capability flag as completed; only sent with `Done`.
    async fn set_site_status(
        &self,
        domain: &str,
        status: SiteStatus,
        step: Option<CompletedStep>,
    ) -> CoreResult<()>;

    async fn set_site_credentials(
        &self,
        domain: &str,
        login: &str,
        password: &str,
    ) -> CoreResult<()>;
}
