//! 插件管理服务

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::{Shell, WpCli};
use crate::services::ServiceContext;
use crate::types::{AuthMethod, CompletedStep, HostTarget, SiteStatus};

/// Replace a site's plugins with the configured set.
pub struct PluginService {
    ctx: Arc<ServiceContext>,
}

impl PluginService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Deactivate and delete every plugin, then install and activate the configured set.
    ///
    /// A plugin that stays inactive after one retry is skipped.
    pub async fn install_plugins(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = self.run(server, domain).await;
        self.ctx
            .finish_site(
                domain,
                "install plugins",
                &result,
                Some(CompletedStep::PluginsInstalled),
            )
            .await;
        result
    }

    async fn run(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
        let result = self.replace_plugins(&shell, domain).await;
        shell.close().await;
        result
    }

    async fn replace_plugins(&self, shell: &Shell, domain: &str) -> CoreResult<()> {
        let wp = WpCli::new(&self.ctx.settings, domain);
        shell.attempt_exit(&wp.cmd("plugin deactivate --all")).await?;
        shell.attempt_exit(&wp.cmd("plugin delete --all")).await?;

        let mut skipped = Vec::new();
        for plugin in &self.ctx.settings.plugins {
            if !install_and_activate(shell, &wp, plugin).await? {
                log::warn!("[{domain}] Plugin {plugin} did not activate, skipping");
                skipped.push(plugin.as_str());
            }
        }
        run_init_hooks(shell, &wp).await?;

        if skipped.is_empty() {
            log::info!("[{domain}] {} plugins active", self.ctx.settings.plugins.len());
        } else {
            log::warn!("[{domain}] Plugins skipped: {}", skipped.join(", "));
        }
        Ok(())
    }
}

/// Install and activate one plugin, verify it, and retry activation once.
///
/// Installing an already installed plugin is not a failure. Returns whether
/// the plugin ended up active.
pub(crate) async fn install_and_activate(
    shell: &Shell,
    wp: &WpCli,
    plugin: &str,
) -> CoreResult<bool> {
    let activate = wp.cmd(&format!("plugin activate {plugin}"));
    shell
        .attempt_exit(&wp.cmd(&format!("plugin install {plugin}")))
        .await?;
    shell.attempt_exit(&activate).await?;
    if is_active(shell, wp, plugin).await? {
        return Ok(true);
    }

    log::info!("[{}] {plugin} is not active, activating again", shell.host());
    shell.attempt_exit(&activate).await?;
    is_active(shell, wp, plugin).await
}

async fn is_active(shell: &Shell, wp: &WpCli, plugin: &str) -> CoreResult<bool> {
    match shell.run(&wp.cmd(&format!("plugin is-active {plugin}"))).await {
        Ok(output) => Ok(output.exited_ok()),
        Err(e) if e.is_transport() => Err(e),
        Err(_) => Ok(false),
    }
}

/// Let freshly activated plugins run their setup hooks.
pub(crate) async fn run_init_hooks(shell: &Shell, wp: &WpCli) -> CoreResult<()> {
    shell
        .attempt_exit(&wp.cmd(r#"eval "do_action('init'); do_action('wp_loaded');""#))
        .await?;
    Ok(())
}
