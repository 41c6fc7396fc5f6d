//! 站点删除服务

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::commands::drop_database_commands;
use crate::remote::naming::db_identifier;
use crate::remote::{shell_quote, Shell};
use crate::services::{log_failure, ServiceContext};
use crate::types::{AuthMethod, HostTarget, ServerStatus, SiteStatus};

/// Best-effort removal of sites. A removed site goes back to `added`, which
/// clears its completed steps in the system of record.
pub struct TeardownService {
    ctx: Arc<ServiceContext>,
}

impl TeardownService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Remove one site: files, vhosts, database and user, then restart Apache.
    ///
    /// Failing steps are logged and the rest still run. Only a lost session
    /// ends the site in `error`.
    pub async fn teardown_site(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = async {
                let failed = self.remove_site(&shell, domain).await?;
                restart_apache(&shell).await?;
                Ok(failed)
            }
            .await;
            shell.close().await;
            result
        }
        .await;
        self.finish(domain, &result).await;
        result.map(|_| ())
    }

    /// Remove every listed site of one server, isolated per site, with a
    /// single Apache restart at the end.
    ///
    /// Removed sites return to `added` even if the restart fails; a failed
    /// restart marks the server `error` instead.
    pub async fn teardown_server_sites(
        &self,
        server: &HostTarget,
        domains: &[String],
    ) -> CoreResult<()> {
        let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
        let mut removed = Vec::new();
        for domain in domains {
            self.ctx
                .report_site(domain, SiteStatus::Configuring, None)
                .await;
            let result = self.remove_site(&shell, domain).await;
            match &result {
                Ok(_) => removed.push(domain.as_str()),
                Err(_) => self.finish(domain, &result).await,
            }
            if matches!(&result, Err(e) if e.is_transport()) {
                break;
            }
        }

        let restarted = restart_apache(&shell).await;
        shell.close().await;
        for domain in removed {
            log::info!("[{domain}] teardown finished");
            self.ctx.report_site(domain, SiteStatus::Added, None).await;
        }
        if let Err(e) = &restarted {
            log_failure(&server.address, "restart apache", e);
            self.ctx
                .report_server(&server.address, ServerStatus::Error)
                .await;
        }
        Ok(())
    }

    /// Returns how many steps failed.
    async fn remove_site(&self, shell: &Shell, domain: &str) -> CoreResult<usize> {
        let settings = &self.ctx.settings;
        let db = db_identifier(domain);
        let mut commands = vec![
            format!("rm -rf {}", shell_quote(&settings.site_root(domain))),
            format!(
                "rm -f {} {}",
                settings.http_vhost_path(domain),
                settings.ssl_vhost_path(domain)
            ),
        ];
        commands.extend(drop_database_commands(&db, &db));

        let failed = shell.attempt_all(&commands).await?;
        if failed > 0 {
            log::warn!("[{domain}] {failed} teardown steps failed");
        }
        Ok(failed)
    }

    async fn finish(&self, domain: &str, result: &CoreResult<usize>) {
        match result {
            Ok(_) => {
                log::info!("[{domain}] teardown finished");
                self.ctx.report_site(domain, SiteStatus::Added, None).await;
            }
            Err(e) => {
                log_failure(domain, "teardown", e);
                self.ctx.report_site(domain, SiteStatus::Error, None).await;
            }
        }
    }
}

async fn restart_apache(shell: &Shell) -> CoreResult<()> {
    shell.attempt_exit("systemctl restart httpd").await?;
    Ok(())
}
