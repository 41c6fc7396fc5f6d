//! 站点迁移服务
//!
//! 源主机打包 → 经由本进程中转 → 目标主机恢复并签发证书。

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::commands::{certbot_install_commands, shell_quote};
use crate::remote::naming::db_identifier;
use crate::remote::templates::http_vhost;
use crate::remote::wp_config::extract_db_credentials;
use crate::remote::{DbCredentials, Shell};
use crate::services::certificate_service::{allow_https, issue_certificate};
use crate::services::ServiceContext;
use crate::types::{AuthMethod, HostTarget, SiteStatus};

/// Everything needed to recreate a site elsewhere.
struct SiteBundle {
    archive: Vec<u8>,
    dump: Vec<u8>,
    vhost: Vec<u8>,
    db: DbCredentials,
}

pub struct TransferService {
    ctx: Arc<ServiceContext>,
}

impl TransferService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Move a site from `source` to `destination`.
    ///
    /// Nothing reaches the destination unless the whole source phase
    /// succeeded. A destination failure leaves whatever was already restored
    /// in place. DNS must already point at the destination so certbot can
    /// validate.
    pub async fn transfer(
        &self,
        source: &HostTarget,
        destination: &HostTarget,
        domain: &str,
    ) -> CoreResult<()> {
        self.ctx
            .report_site(domain, SiteStatus::Configuring, None)
            .await;
        let result = async {
            let bundle = self.pack(source, domain).await?;
            log::info!(
                "[{domain}] Packed on {}: archive {} bytes, dump {} bytes",
                source.address,
                bundle.archive.len(),
                bundle.dump.len()
            );
            self.restore(destination, domain, &bundle).await
        }
        .await;
        self.ctx
            .finish_site(domain, "transfer site", &result, None)
            .await;
        result
    }

    async fn pack(&self, source: &HostTarget, domain: &str) -> CoreResult<SiteBundle> {
        let mut shell = self.ctx.open_shell(source, &AuthMethod::KeyPair).await?;
        let result = self.pack_steps(&mut shell, domain).await;
        shell.close().await;
        result
    }

    async fn pack_steps(&self, shell: &mut Shell, domain: &str) -> CoreResult<SiteBundle> {
        let settings = &self.ctx.settings;
        let archive_path = archive_path(domain);
        shell
            .check_exit(&format!(
                "tar -czf {archive_path} -C {} {domain}",
                settings.web_root
            ))
            .await?;

        let wp_config = shell
            .read_to_string(&format!("{}/wp-config.php", settings.site_root(domain)))
            .await?;
        let db = extract_db_credentials(&wp_config)?;
        shell.add_secret(db.password.clone());

        let dump_path = dump_path(domain);
        shell.check_exit(&db.dump_command(&dump_path)).await?;

        let archive = shell.read_file(&archive_path).await?;
        let dump = shell.read_file(&dump_path).await?;
        let vhost = match shell.read_file(&settings.http_vhost_path(domain)).await {
            Ok(vhost) => vhost,
            Err(e) if e.is_transport() => return Err(e),
            Err(e) => {
                log::warn!("[{domain}] No vhost on source ({e}), generating one");
                http_vhost(settings, domain).into_bytes()
            }
        };

        shell.attempt(&remove_command(&archive_path, &dump_path)).await?;
        Ok(SiteBundle {
            archive,
            dump,
            vhost,
            db,
        })
    }

    async fn restore(
        &self,
        destination: &HostTarget,
        domain: &str,
        bundle: &SiteBundle,
    ) -> CoreResult<()> {
        let mut shell = self
            .ctx
            .open_shell(destination, &AuthMethod::KeyPair)
            .await?;
        shell.add_secret(bundle.db.password.clone());
        let result = self.restore_steps(&shell, domain, bundle).await;
        shell.close().await;
        result
    }

    async fn restore_steps(&self, shell: &Shell, domain: &str, bundle: &SiteBundle) -> CoreResult<()> {
        let settings = &self.ctx.settings;
        let archive_path = archive_path(domain);
        let dump_path = dump_path(domain);

        shell.put_file(&bundle.archive, &archive_path).await?;
        shell.put_file(&bundle.dump, &dump_path).await?;
        shell
            .put_file(&bundle.vhost, &settings.http_vhost_path(domain))
            .await?;

        shell
            .check_exit(&format!("tar -xzf {archive_path} -C {}", settings.web_root))
            .await?;
        shell.check_all(&bundle.db.create_commands()).await?;
        shell
            .check_exit(&bundle.db.restore_command(&dump_path))
            .await?;
        shell.check_exit("systemctl restart httpd").await?;

        shell.attempt_all(&certbot_install_commands()).await?;
        shell.attempt_exit("dnf install -y -q mod_ssl").await?;
        if let Err(e) = allow_https(shell).await {
            if e.is_transport() {
                return Err(e);
            }
            log::warn!("[{domain}] Could not open HTTPS in the firewall: {e}");
        }
        issue_certificate(shell, settings, domain, domain).await?;
        shell.check_exit("systemctl restart httpd").await?;

        shell.attempt(&remove_command(&archive_path, &dump_path)).await?;
        Ok(())
    }
}

fn archive_path(domain: &str) -> String {
    format!("/tmp/{domain}.tar.gz")
}

fn dump_path(domain: &str) -> String {
    format!("/tmp/{}.sql", db_identifier(domain))
}

fn remove_command(archive_path: &str, dump_path: &str) -> String {
    format!("rm -f {} {}", shell_quote(archive_path), shell_quote(dump_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::TestHarness;

    const SOURCE: &str = "10.0.0.5";
    const DEST: &str = "10.0.0.9";
    const WP_CONFIG: &str = "<?php
define( 'DB_NAME', 'a_com' );
define( 'DB_USER', 'a_com' );
define( 'DB_PASSWORD', 'Xk2v9QpL0aZr7TgH1mNc5Ydw' );
";

    fn harness() -> TestHarness {
        let h = TestHarness::new();
        h.executor
            .set_file(SOURCE, "/var/www/a.com/wp-config.php", WP_CONFIG.as_bytes());
        h.executor.set_file(SOURCE, "/tmp/a.com.tar.gz", b"tgz-bytes");
        h.executor.set_file(SOURCE, "/tmp/a_com.sql", b"-- dump");
        h.executor
            .set_file(SOURCE, "/etc/httpd/conf.d/a.com.conf", b"<VirtualHost *:80>");
        h
    }

    async fn run(h: &TestHarness) -> CoreResult<()> {
        TransferService::new(h.ctx.clone())
            .transfer(&HostTarget::new(SOURCE), &HostTarget::new(DEST), "a.com")
            .await
    }

    #[tokio::test]
    async fn moves_files_database_and_certificate() {
        let h = harness();
        run(&h).await.unwrap();

        assert_eq!(
            h.executor.file_contents(DEST, "/tmp/a.com.tar.gz").unwrap(),
            b"tgz-bytes"
        );
        assert_eq!(
            h.executor.file_contents(DEST, "/tmp/a_com.sql").unwrap(),
            b"-- dump"
        );
        assert_eq!(
            h.executor
                .file_contents(DEST, "/etc/httpd/conf.d/a.com.conf")
                .unwrap(),
            b"<VirtualHost *:80>"
        );
        assert!(h.executor.ran(DEST, "tar -xzf /tmp/a.com.tar.gz -C /var/www"));
        assert!(h.executor.ran(DEST, "CREATE DATABASE `a_com`"));
        assert!(h.executor.ran(DEST, "mysql 'a_com' < '/tmp/a_com.sql'"));
        assert!(h.executor.ran(DEST, "--email admin@a.com -d a.com"));
        assert!(h
            .executor
            .files_put(DEST)
            .contains(&"/etc/httpd/conf.d/a.com-ssl.conf".to_string()));
        assert_eq!(
            h.reporter.site_statuses("a.com").await,
            vec![SiteStatus::Configuring, SiteStatus::Done]
        );
        assert_eq!(h.executor.close_count(SOURCE), 1);
        assert_eq!(h.executor.close_count(DEST), 1);
    }

    #[tokio::test]
    async fn archive_failure_never_touches_destination() {
        let h = harness();
        h.executor
            .fail_matching_on(SOURCE, "tar -czf", "tar: a.com: Cannot stat: No such file");
        assert!(run(&h).await.is_err());

        assert!(h.executor.opened_with(DEST).is_empty());
        assert!(h.executor.files_put(DEST).is_empty());
        assert_eq!(
            h.reporter.last_site_report("a.com").await,
            Some((SiteStatus::Error, None))
        );
        assert_eq!(h.executor.close_count(SOURCE), 1);
    }

    #[tokio::test]
    async fn unreadable_credentials_stop_before_dump() {
        let h = harness();
        h.executor.set_file(
            SOURCE,
            "/var/www/a.com/wp-config.php",
            b"<?php define( 'DB_NAME', 'a_com' );",
        );
        let result = run(&h).await;

        assert!(matches!(result, Err(CoreError::Extraction(_))));
        assert!(!h.executor.ran(SOURCE, "mysqldump"));
        assert!(h.executor.opened_with(DEST).is_empty());
    }

    #[tokio::test]
    async fn extracted_database_name_is_quoted() {
        let h = harness();
        h.executor.set_file(
            SOURCE,
            "/var/www/a.com/wp-config.php",
            b"<?php
define( 'DB_NAME', 'a_com; reboot' );
define( 'DB_USER', 'a_com' );
define( 'DB_PASSWORD', 'Xk2v9QpL0aZr7TgH1mNc5Ydw' );
",
        );
        run(&h).await.unwrap();

        assert!(h
            .executor
            .ran(SOURCE, "mysqldump 'a_com; reboot' > '/tmp/a_com.sql'"));
        assert!(h
            .executor
            .ran(DEST, "mysql 'a_com; reboot' < '/tmp/a_com.sql'"));
        assert!(h.executor.ran(DEST, "CREATE DATABASE `a_com; reboot`"));
        assert!(!h.executor.ran(SOURCE, "mysqldump a_com;"));
    }

    #[tokio::test]
    async fn destination_failure_keeps_restored_state() {
        let h = harness();
        h.executor.fail_matching_on(
            DEST,
            "certbot certonly",
            "Certbot failed to authenticate some domains",
        );
        assert!(run(&h).await.is_err());

        assert!(h.executor.ran(DEST, "mysql 'a_com' < '/tmp/a_com.sql'"));
        assert!(!h.executor.ran(DEST, "rm -f '/tmp/a.com.tar.gz'"));
        assert_eq!(
            h.reporter.last_site_report("a.com").await,
            Some((SiteStatus::Error, None))
        );
        assert_eq!(h.executor.close_count(DEST), 1);
    }
}
