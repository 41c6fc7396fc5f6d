//! Provisioning workflows

mod certificate_service;
mod contact_form_service;
mod dns_routing_service;
mod fleet_service;
mod plugin_service;
mod post_service;
mod report_service;
mod server_bootstrap_service;
mod teardown_service;
mod theme_service;
mod transfer_service;
mod wordpress_service;

pub use certificate_service::CertificateService;
pub use contact_form_service::ContactFormService;
pub use dns_routing_service::DnsRoutingService;
pub use fleet_service::FleetService;
pub use plugin_service::PluginService;
pub use post_service::{PostRunSummary, PostService};
pub use report_service::{build_report_csv, ReportService};
pub use server_bootstrap_service::ServerBootstrapService;
pub use teardown_service::TeardownService;
pub use theme_service::ThemeService;
pub use transfer_service::TransferService;
pub use wordpress_service::WordpressService;

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::Shell;
use crate::traits::{
    ContentGenerator, DnsProviderFactory, KeyRepository, RemoteExecutor, ReportMailer,
    StatusReporter,
};
use crate::types::{AuthMethod, CompletedStep, HostTarget, ServerStatus, SiteStatus, WorkflowSettings};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入远程执行、密钥、状态上报等实现。
pub struct ServiceContext {
    /// Remote shell sessions
    pub executor: Arc<dyn RemoteExecutor>,
    /// Per-server key pairs
    pub keys: Arc<dyn KeyRepository>,
    /// Status updates toward the system of record (normally the outbox)
    pub reporter: Arc<dyn StatusReporter>,
    /// Generated text and images
    pub generator: Arc<dyn ContentGenerator>,
    /// DNS provider and registrar clients
    pub dns: Arc<dyn DnsProviderFactory>,
    /// Report delivery
    pub mailer: Arc<dyn ReportMailer>,
    pub settings: WorkflowSettings,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        executor: Arc<dyn RemoteExecutor>,
        keys: Arc<dyn KeyRepository>,
        reporter: Arc<dyn StatusReporter>,
        generator: Arc<dyn ContentGenerator>,
        dns: Arc<dyn DnsProviderFactory>,
        mailer: Arc<dyn ReportMailer>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            executor,
            keys,
            reporter,
            generator,
            dns,
            mailer,
            settings,
        }
    }

    /// Open a session and wrap it with the configured command timeout.
    pub async fn open_shell(&self, target: &HostTarget, auth: &AuthMethod) -> CoreResult<Shell> {
        let session = self.executor.open(target, auth).await?;
        Ok(Shell::new(
            session,
            target.address.clone(),
            self.settings.command_timeout,
        ))
    }

    /// 上报服务器状态。失败只记录日志，不影响工作流。
    pub async fn report_server(&self, server: &str, status: ServerStatus) {
        if let Err(e) = self.reporter.set_server_status(server, status).await {
            log::error!("[{server}] Failed to report server status {}: {e}", status.as_str());
        }
    }

    /// 上报站点状态。失败只记录日志，不影响工作流。
    pub async fn report_site(&self, domain: &str, status: SiteStatus, step: Option<CompletedStep>) {
        if let Err(e) = self.reporter.set_site_status(domain, status, step).await {
            log::error!("[{domain}] Failed to report site status {}: {e}", status.as_str());
        }
    }

    pub async fn report_credentials(&self, domain: &str, login: &str, password: &str) {
        if let Err(e) = self
            .reporter
            .set_site_credentials(domain, login, password)
            .await
        {
            log::error!("[{domain}] Failed to report admin credentials: {e}");
        }
    }

    /// Report the terminal server status for a finished workflow.
    pub async fn finish_server<T>(&self, server: &str, workflow: &str, result: &CoreResult<T>) {
        match result {
            Ok(_) => {
                log::info!("[{server}] {workflow} finished");
                self.report_server(server, ServerStatus::Added).await;
            }
            Err(e) => {
                log_failure(server, workflow, e);
                self.report_server(server, ServerStatus::Error).await;
            }
        }
    }

    /// Report the terminal site status for a finished workflow.
    ///
    /// `step` is only sent on success.
    pub async fn finish_site<T>(
        &self,
        domain: &str,
        workflow: &str,
        result: &CoreResult<T>,
        step: Option<CompletedStep>,
    ) {
        match result {
            Ok(_) => {
                log::info!("[{domain}] {workflow} finished");
                self.report_site(domain, SiteStatus::Done, step).await;
            }
            Err(e) => {
                log_failure(domain, workflow, e);
                self.report_site(domain, SiteStatus::Error, None).await;
            }
        }
    }
}

/// warn for expected failures (unreachable host, rejected command), error otherwise.
pub(crate) fn log_failure(entity: &str, workflow: &str, error: &CoreError) {
    if error.is_expected() {
        log::warn!("[{entity}] {workflow} failed: {error}");
    } else {
        log::error!("[{entity}] {workflow} failed: {error}");
    }
}

/// Generated text is interpolated into shell and PHP strings; drop the quotes
/// language models like to wrap titles in.
pub(crate) fn strip_quotes(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '\u{201c}' | '\u{201d}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_quotes_removes_wrapping_quotes() {
        assert_eq!(strip_quotes("\"Best Coffee Beans\"\n"), "Best Coffee Beans");
        assert_eq!(strip_quotes("Tom's `Guide`"), "Toms Guide");
    }
}
