//! 工作流路由：调用 → 服务

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::{
    CertificateService, ContactFormService, DnsRoutingService, FleetService, PluginService,
    PostService, ReportService, ServerBootstrapService, ServiceContext, TeardownService,
    ThemeService, TransferService, WordpressService,
};
use crate::types::WorkflowInvocation;

/// Runs one invocation against the matching service.
#[derive(Clone)]
pub struct WorkflowRunner {
    ctx: Arc<ServiceContext>,
}

impl WorkflowRunner {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    pub async fn run(&self, invocation: &WorkflowInvocation) -> CoreResult<()> {
        let ctx = Arc::clone(&self.ctx);
        match invocation {
            // ===== 服务器 =====
            WorkflowInvocation::BootstrapServer { server } => {
                ServerBootstrapService::new(ctx).bootstrap(server).await
            }
            WorkflowInvocation::InstallKey { server } => {
                ServerBootstrapService::new(ctx).install_key(server).await
            }
            WorkflowInvocation::InstallCertbot { server } => {
                FleetService::new(ctx).install_certbot(server).await
            }
            WorkflowInvocation::InstallWpCli { server } => {
                FleetService::new(ctx).install_wp_cli(server).await
            }
            WorkflowInvocation::Reboot { server } => FleetService::new(ctx).reboot(server).await,
            WorkflowInvocation::DisableSelinux { server } => {
                FleetService::new(ctx).disable_selinux(server).await
            }
            WorkflowInvocation::RestartApache { server } => {
                FleetService::new(ctx).restart_apache(server).await
            }
            WorkflowInvocation::IssueCertificates { server, domains } => {
                CertificateService::new(ctx).issue(server, domains).await
            }

            // ===== 站点 =====
            WorkflowInvocation::InstallWordpress {
                server,
                domain,
                keyword,
            } => WordpressService::new(ctx).install(server, domain, keyword).await,
            WorkflowInvocation::NewAdmin { server, domain } => {
                WordpressService::new(ctx).new_admin(server, domain).await
            }
            WorkflowInvocation::DeletePosts { server, domain } => {
                WordpressService::new(ctx).delete_posts(server, domain).await
            }
            WorkflowInvocation::ConfigureHttp { server, domain } => {
                WordpressService::new(ctx).configure_http(server, domain).await
            }
            WorkflowInvocation::InstallPlugins { server, domain } => {
                PluginService::new(ctx).install_plugins(server, domain).await
            }
            WorkflowInvocation::BulkInstallPlugin {
                server,
                domains,
                plugin,
            } => {
                FleetService::new(ctx)
                    .bulk_install_plugin(server, domains, plugin)
                    .await
            }
            WorkflowInvocation::BulkDeletePlugin {
                server,
                domains,
                plugin,
            } => {
                FleetService::new(ctx)
                    .bulk_delete_plugin(server, domains, plugin)
                    .await
            }
            WorkflowInvocation::ChangeTheme {
                server,
                domain,
                theme,
            } => ThemeService::new(ctx).change_theme(server, domain, theme).await,
            WorkflowInvocation::GeneratePosts {
                server,
                domain,
                keyword,
                count,
            } => {
                let summary = PostService::new(ctx)
                    .generate_posts(server, domain, keyword, *count)
                    .await?;
                log::info!(
                    "[{domain}] {} posts created, {} skipped",
                    summary.created,
                    summary.skipped
                );
                Ok(())
            }
            WorkflowInvocation::AddContactForm {
                server,
                domain,
                keyword,
            } => {
                ContactFormService::new(ctx)
                    .add_contact_form(server, domain, keyword)
                    .await
            }
            WorkflowInvocation::TransferSite {
                source,
                destination,
                domain,
            } => {
                TransferService::new(ctx)
                    .transfer(source, destination, domain)
                    .await
            }
            WorkflowInvocation::TeardownSite { server, domain } => {
                TeardownService::new(ctx).teardown_site(server, domain).await
            }
            WorkflowInvocation::TeardownServerSites { server, domains } => {
                TeardownService::new(ctx)
                    .teardown_server_sites(server, domains)
                    .await
            }

            // ===== DNS =====
            WorkflowInvocation::AttachDomain {
                account,
                domain,
                registrar,
            } => DnsRoutingService::new(ctx)
                .attach_domain(account, domain, registrar.as_ref())
                .await
                .map(|_| ()),
            WorkflowInvocation::PointDomain {
                account,
                domain,
                server_ip,
            } => {
                if !DnsRoutingService::new(ctx)
                    .point_when_active(account, domain, server_ip)
                    .await?
                {
                    log::info!("[{domain}] Zone not active yet, records unchanged");
                }
                Ok(())
            }
            WorkflowInvocation::RepointDomain {
                account,
                domain,
                server_ip,
                ssl_mode,
            } => {
                DnsRoutingService::new(ctx)
                    .repoint(account, domain, server_ip, *ssl_mode)
                    .await
            }

            // ===== 报表 =====
            WorkflowInvocation::SendDomainReport { recipient, rows } => {
                ReportService::new(ctx)
                    .send_domain_report(recipient, rows)
                    .await
            }
        }
    }
}
