//! WordPress 站点服务
//!
//! 安装、管理员、文章清理与 HTTP 虚拟主机。

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::naming::{
    db_identifier, random_nickname, random_password, random_phone, PASSWORD_LENGTH,
};
use crate::remote::templates::{about_page, http_vhost, HTACCESS};
use crate::remote::{shell_quote, DbCredentials, Shell, WpCli};
use crate::services::{strip_quotes, ServiceContext};
use crate::types::{AuthMethod, HostTarget, SiteStatus};

const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Admin login and password generated for a site.
struct AdminCredentials {
    login: String,
    password: String,
}

impl AdminCredentials {
    fn generate() -> Self {
        let mut rng = rand::rng();
        Self {
            login: random_nickname(&mut rng),
            password: random_password(&mut rng, PASSWORD_LENGTH),
        }
    }
}

pub struct WordpressService {
    ctx: Arc<ServiceContext>,
}

impl WordpressService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create the database, download and install WordPress, and seed the site.
    ///
    /// Database creation, download, configuration and `core install` are
    /// load-bearing; the remaining steps are best effort. Admin credentials
    /// are reported through the status reporter, never stored.
    pub async fn install(&self, server: &HostTarget, domain: &str, keyword: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let mut shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = self.install_steps(&mut shell, domain, keyword).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_site(domain, "install wordpress", &result, None)
            .await;
        result
    }

    async fn install_steps(&self, shell: &mut Shell, domain: &str, keyword: &str) -> CoreResult<()> {
        let wp = WpCli::new(&self.ctx.settings, domain);
        let db = DbCredentials {
            name: db_identifier(domain),
            user: db_identifier(domain),
            password: random_password(&mut rand::rng(), PASSWORD_LENGTH),
        };
        let admin = AdminCredentials::generate();
        shell.add_secret(db.password.clone());
        shell.add_secret(admin.password.clone());

        shell.check_all(&db.create_commands()).await?;
        shell.check_exit(&wp.cmd("core download")).await?;
        shell
            .check_exit(&wp.cmd(&format!(
                "config create --dbname={} --dbuser={} --dbpass={}",
                db.name,
                db.user,
                shell_quote(&db.password)
            )))
            .await?;
        shell
            .attempt_exit(&wp.cmd("config set FS_METHOD direct"))
            .await?;
        shell
            .attempt_exit(&wp.cmd("config set DISALLOW_FILE_EDIT true --raw"))
            .await?;
        self.write_htaccess(shell, &wp).await?;

        let title = self.site_title(keyword).await;
        shell
            .check_exit(&wp.cmd(&format!(
                "core install --url={domain} --title={} --admin_user={} --admin_password={} --admin_email=admin@{domain} --skip-email",
                shell_quote(&title),
                admin.login,
                shell_quote(&admin.password)
            )))
            .await?;
        self.ctx
            .report_credentials(domain, &admin.login, &admin.password)
            .await;

        shell
            .attempt_exit(&wp.cmd("post delete 1 2 --force"))
            .await?;
        rename_default_category(shell, &wp).await?;
        self.create_about_page(shell, &wp, domain).await
    }

    async fn write_htaccess(&self, shell: &Shell, wp: &WpCli) -> CoreResult<()> {
        let path = format!("{}/.htaccess", wp.site_root());
        match shell.put_file(HTACCESS.as_bytes(), &path).await {
            Err(e) if e.is_transport() => Err(e),
            Err(e) => {
                log::warn!("[{}] Failed to write {path}: {e}", shell.host());
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Generated site title; the keyword itself when generation fails.
    async fn site_title(&self, keyword: &str) -> String {
        match self.ctx.generator.generate_title(keyword).await {
            Ok(title) if !strip_quotes(&title).is_empty() => strip_quotes(&title),
            Ok(_) => keyword.to_string(),
            Err(e) => {
                log::warn!("Title generation failed, using keyword: {e}");
                keyword.to_string()
            }
        }
    }

    async fn create_about_page(&self, shell: &Shell, wp: &WpCli, domain: &str) -> CoreResult<()> {
        let address = match self.ctx.generator.generate_address().await {
            Ok(address) => Some(address.trim().to_string()),
            Err(e) => {
                log::warn!("[{domain}] Address generation failed, page without address: {e}");
                None
            }
        };
        let phone = random_phone(&mut rand::rng());
        let content = about_page(domain, address.as_deref(), &phone);
        shell
            .attempt_exit(&wp.cmd(&format!(
                "post create --post_type=page --post_title='About Us' --post_content={} --post_status=publish",
                shell_quote(&content)
            )))
            .await?;
        Ok(())
    }

    /// Create one more administrator and report its credentials.
    pub async fn new_admin(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let mut shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let admin = AdminCredentials::generate();
            shell.add_secret(admin.password.clone());
            let wp = WpCli::new(&self.ctx.settings, domain);
            let result = shell
                .check_exit(&wp.cmd(&format!(
                    "user create {login} {login}@{domain} --role=administrator --user_pass={}",
                    shell_quote(&admin.password),
                    login = admin.login
                )))
                .await;
            shell.close().await;
            result?;
            self.ctx
                .report_credentials(domain, &admin.login, &admin.password)
                .await;
            Ok(())
        }
        .await;
        self.ctx
            .finish_site(domain, "new admin", &result, None)
            .await;
        result
    }

    /// Delete every post of type `post`.
    pub async fn delete_posts(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let result = delete_all_posts(&shell, &WpCli::new(&self.ctx.settings, domain)).await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_site(domain, "delete posts", &result, None)
            .await;
        result
    }

    /// Write the port-80 virtual host.
    pub async fn configure_http(&self, server: &HostTarget, domain: &str) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let shell = self.ctx.open_shell(server, &AuthMethod::KeyPair).await?;
            let settings = &self.ctx.settings;
            let result = shell
                .put_file(
                    http_vhost(settings, domain).as_bytes(),
                    &settings.http_vhost_path(domain),
                )
                .await;
            shell.close().await;
            result
        }
        .await;
        self.ctx
            .finish_site(domain, "configure http", &result, None)
            .await;
        result
    }
}

/// Rename "Uncategorized" to "Articles". Best effort.
async fn rename_default_category(shell: &Shell, wp: &WpCli) -> CoreResult<()> {
    let lookup = wp.cmd(&format!(
        "term list category --name={DEFAULT_CATEGORY} --field=term_id"
    ));
    let term_id = match shell.check_exit(&lookup).await {
        Ok(output) => output.stdout.lines().next().unwrap_or("").trim().to_string(),
        Err(e) if e.is_transport() => return Err(e),
        Err(e) => {
            log::warn!("[{}] Category lookup failed: {e}", shell.host());
            return Ok(());
        }
    };
    if term_id.is_empty() || !term_id.chars().all(|c| c.is_ascii_digit()) {
        log::info!("[{}] No {DEFAULT_CATEGORY} category to rename", shell.host());
        return Ok(());
    }
    shell
        .attempt_exit(&wp.cmd(&format!(
            "term update category {term_id} --name='Articles' --slug='articles'"
        )))
        .await?;
    Ok(())
}

async fn delete_all_posts(shell: &Shell, wp: &WpCli) -> CoreResult<()> {
    let ids = shell
        .check_exit(&wp.cmd("post list --post_type=post --format=ids"))
        .await?
        .stdout;
    let ids: Vec<&str> = ids
        .split_whitespace()
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
        .collect();
    if ids.is_empty() {
        log::info!("[{}] No posts to delete", shell.host());
        return Ok(());
    }
    shell
        .check_exit(&wp.cmd(&format!("post delete {} --force", ids.join(" "))))
        .await?;
    log::info!("[{}] Deleted {} posts", shell.host(), ids.len());
    Ok(())
}
