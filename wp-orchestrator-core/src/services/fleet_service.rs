//! 服务器批量运维服务

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::commands::{certbot_install_commands, wp_cli_install_commands};
use crate::remote::{Shell, WpCli};
use crate::services::plugin_service::{install_and_activate, run_init_hooks};
use crate::services::ServiceContext;
use crate::types::{AuthMethod, HostTarget, ServerStatus, SiteStatus};

const SELINUX_CONFIG: &str = "/etc/selinux/config";

/// Thin server-level operations and per-site bulk plugin operations.
pub struct FleetService {
    ctx: Arc<ServiceContext>,
}

impl FleetService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn install_certbot(&self, server: &HostTarget) -> CoreResult<()> {
        self.ctx
            .report_server(&server.address, ServerStatus::Configuring)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = shell.attempt_all(&certbot_install_commands()).await;
            shell.close().await;
            result.map(|_| ())
        }
        .await;
        self.ctx
            .finish_server(&server.address, "install certbot", &result)
            .await;
        result
    }

    /// Install WP-CLI and check that it runs.
    pub async fn install_wp_cli(&self, server: &HostTarget) -> CoreResult<()> {
        self.ctx
            .report_server(&server.address, ServerStatus::Configuring)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = self.install_wp_cli_steps(&shell).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_server(&server.address, "install wp-cli", &result)
            .await;
        result
    }

    async fn install_wp_cli_steps(&self, shell: &Shell) -> CoreResult<()> {
        shell
            .attempt_all(&wp_cli_install_commands(&self.ctx.settings))
            .await?;
        shell
            .check_exit(&format!("{} --info --allow-root", self.ctx.settings.wp_cli))
            .await?;
        Ok(())
    }

    /// Schedule a reboot; the server is reported `added` once the command was accepted.
    pub async fn reboot(&self, server: &HostTarget) -> CoreResult<()> {
        self.single_command(server, "reboot", "shutdown -r").await
    }

    pub async fn restart_apache(&self, server: &HostTarget) -> CoreResult<()> {
        self.single_command(server, "restart apache", "systemctl restart httpd")
            .await
    }

    async fn single_command(
        &self,
        server: &HostTarget,
        workflow: &str,
        command: &str,
    ) -> CoreResult<()> {
        self.ctx
            .report_server(&server.address, ServerStatus::Configuring)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = shell.check_exit(command).await;
            shell.close().await;
            result.map(|_| ())
        }
        .await;
        self.ctx
            .finish_server(&server.address, workflow, &result)
            .await;
        result
    }

    /// Switch SELinux to permissive now and on the next boot.
    pub async fn disable_selinux(&self, server: &HostTarget) -> CoreResult<()> {
        self.ctx
            .report_server(&server.address, ServerStatus::Configuring)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = disable_selinux_steps(&shell).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_server(&server.address, "disable selinux", &result)
            .await;
        result
    }

    /// Install and activate one plugin on many sites of a server.
    ///
    /// Each site enters `configuring` on its own; one site's failure does not
    /// affect the others.
    pub async fn bulk_install_plugin(
        &self,
        server: &HostTarget,
        domains: &[String],
        plugin: &str,
    ) -> CoreResult<()> {
        let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
        for domain in domains {
            self.ctx
                .report_site(domain, SiteStatus::Configuring, None)
                .await;
            let result = self.install_on_site(&shell, domain, plugin).await;
            self.ctx
                .finish_site(domain, "bulk install plugin", &result, None)
                .await;
            if matches!(&result, Err(e) if e.is_transport()) {
                break;
            }
        }
        shell.close().await;
        Ok(())
    }

    async fn install_on_site(&self, shell: &Shell, domain: &str, plugin: &str) -> CoreResult<()> {
        let wp = WpCli::new(&self.ctx.settings, domain);
        if !install_and_activate(shell, &wp, plugin).await? {
            return Err(CoreError::Command {
                host: shell.host().to_string(),
                command: format!("plugin activate {plugin}"),
                detail: format!("{plugin} is not active on {domain}"),
            });
        }
        run_init_hooks(shell, &wp).await
    }

    /// Deactivate and delete one plugin on many sites of a server, isolated per site.
    pub async fn bulk_delete_plugin(
        &self,
        server: &HostTarget,
        domains: &[String],
        plugin: &str,
    ) -> CoreResult<()> {
        let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
        for domain in domains {
            self.ctx
                .report_site(domain, SiteStatus::Configuring, None)
                .await;
            let wp = WpCli::new(&self.ctx.settings, domain);
            let result = async {
                shell
                    .attempt_exit(&wp.cmd(&format!("plugin deactivate {plugin}")))
                    .await?;
                shell
                    .check_exit(&wp.cmd(&format!("plugin delete {plugin}")))
                    .await
                    .map(|_| ())
            }
            .await;
            self.ctx
                .finish_site(domain, "bulk delete plugin", &result, None)
                .await;
            if matches!(&result, Err(e) if e.is_transport()) {
                break;
            }
        }
        shell.close().await;
        Ok(())
    }
}

async fn disable_selinux_steps(shell: &Shell) -> CoreResult<()> {
    let mode = shell.check_exit("getenforce").await?;
    let mode = mode.stdout.trim();
    if mode == "Enforcing" {
        shell.check_exit("setenforce 0").await?;
    } else {
        log::info!("[{}] SELinux already {mode}", shell.host());
    }
    shell
        .attempt(&format!(
            "sed -i 's/^SELINUX=enforcing/SELINUX=permissive/' {SELINUX_CONFIG}"
        ))
        .await?;
    Ok(())
}
