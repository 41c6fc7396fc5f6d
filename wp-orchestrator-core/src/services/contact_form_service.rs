//! 联系表单注入服务

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::templates::{contact_form_block, upsert_marked_block};
use crate::remote::{Shell, WpCli};
use crate::services::{strip_quotes, ServiceContext};
use crate::types::{AuthMethod, CompletedStep, HostTarget, SiteStatus};

const FALLBACK_FORM_TITLE: &str = "Contact Us";

pub struct ContactFormService {
    ctx: Arc<ServiceContext>,
}

impl ContactFormService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Put the contact form block into the active theme's `functions.php`.
    ///
    /// The block sits between begin/end markers; running this again replaces
    /// it instead of adding a second filter.
    pub async fn add_contact_form(
        &self,
        server: &HostTarget,
        domain: &str,
        keyword: &str,
    ) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = self.patch_theme(&shell, domain, keyword).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_site(
                domain,
                "add contact form",
                &result,
                Some(CompletedStep::FormAdded),
            )
            .await;
        result
    }

    async fn patch_theme(&self, shell: &Shell, domain: &str, keyword: &str) -> CoreResult<()> {
        let wp = WpCli::new(&self.ctx.settings, domain);
        let output = shell
            .check_exit(&wp.cmd(r#"eval "echo get_template_directory() . '/functions.php';""#))
            .await?;
        let path = output.stdout.trim();
        if path.is_empty() {
            return Err(CoreError::Extraction(format!(
                "no active theme directory for {domain}"
            )));
        }

        let existing = match shell.read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.is_transport() => return Err(e),
            Err(e) => {
                log::info!("[{domain}] {path} not readable ({e}), creating it");
                "<?php\n".to_string()
            }
        };

        let title = self.form_title(keyword).await;
        let patched = upsert_marked_block(&existing, &contact_form_block(&title));
        if patched == existing {
            log::info!("[{domain}] Contact form already in place");
            return Ok(());
        }
        shell.put_file(patched.as_bytes(), path).await
    }

    async fn form_title(&self, keyword: &str) -> String {
        match self.ctx.generator.generate_title(keyword).await {
            Ok(title) if !strip_quotes(&title).is_empty() => strip_quotes(&title),
            Ok(_) => FALLBACK_FORM_TITLE.to_string(),
            Err(e) => {
                log::warn!("Form title generation failed: {e}");
                FALLBACK_FORM_TITLE.to_string()
            }
        }
    }
}
