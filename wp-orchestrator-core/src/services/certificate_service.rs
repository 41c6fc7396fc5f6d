//! SSL 证书服务 (certbot)

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::templates::ssl_vhost;
use crate::remote::Shell;
use crate::services::ServiceContext;
use crate::types::{AuthMethod, HostTarget, ServerStatus, WorkflowSettings};

/// `certbot certonly` for one domain; the contact address is `admin@<contact_domain>`.
pub(crate) fn certbot_command(domain: &str, contact_domain: &str) -> String {
    format!(
        "certbot certonly --apache --non-interactive --agree-tos --email admin@{contact_domain} -d {domain}"
    )
}

/// Request a certificate and write the port-443 vhost that uses it.
///
/// certbot reports progress on stderr, so only its exit status counts.
pub(crate) async fn issue_certificate(
    shell: &Shell,
    settings: &WorkflowSettings,
    domain: &str,
    contact_domain: &str,
) -> CoreResult<()> {
    shell
        .check_exit(&certbot_command(domain, contact_domain))
        .await?;
    shell
        .put_file(
            ssl_vhost(settings, domain).as_bytes(),
            &settings.ssl_vhost_path(domain),
        )
        .await?;
    log::info!("[{domain}] Certificate issued");
    Ok(())
}

/// Open HTTPS in the firewall.
pub(crate) async fn allow_https(shell: &Shell) -> CoreResult<()> {
    shell
        .check_exit("firewall-cmd --permanent --add-service=https")
        .await?;
    shell.check_exit("systemctl reload firewalld").await?;
    Ok(())
}

/// Batch certificate issuance for the sites of one server
pub struct CertificateService {
    ctx: Arc<ServiceContext>,
}

impl CertificateService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Issue a certificate per domain, fail-fast: the first failure aborts the batch.
    pub async fn issue(&self, server: &HostTarget, domains: &[String]) -> CoreResult<()> {
        self.ctx
            .report_server(&server.address, ServerStatus::Configuring)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = self.issue_all(&shell, domains).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_server(&server.address, "issue certificates", &result)
            .await;
        result
    }

    async fn issue_all(&self, shell: &Shell, domains: &[String]) -> CoreResult<()> {
        let Some(contact) = domains.first() else {
            return Ok(());
        };
        shell.attempt_exit("dnf install -y -q mod_ssl").await?;
        for domain in domains {
            issue_certificate(shell, &self.ctx.settings, domain, contact).await?;
        }
        allow_https(shell).await?;
        shell.attempt_exit("systemctl reload httpd").await?;
        Ok(())
    }
}
