//! 主题切换服务

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::WpCli;
use crate::services::ServiceContext;
use crate::types::{AuthMethod, CompletedStep, HostTarget, SiteStatus};

pub struct ThemeService {
    ctx: Arc<ServiceContext>,
}

impl ThemeService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Install and activate a theme from wordpress.org.
    ///
    /// Completes `theme_changed`, which also clears `form_added`: the contact
    /// form lives in the old theme's `functions.php`.
    pub async fn change_theme(
        &self,
        server: &HostTarget,
        domain: &str,
        theme: &str,
    ) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let wp = WpCli::new(&self.ctx.settings, domain);
            let result = shell
                .check_exit(&wp.cmd(&format!("theme install {theme} --activate")))
                .await;
            shell.close().await;
            result.map(|_| ())
        }
        .await;
        self.ctx
            .finish_site(
                domain,
                "change theme",
                &result,
                Some(CompletedStep::ThemeChanged),
            )
            .await;
        result
    }
}
