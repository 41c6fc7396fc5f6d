//! 服务器初始化服务
//!
//! 首次连接使用密码，安装密钥后所有操作改用密钥。

use std::sync::Arc;

use crate::error::CoreResult;
use crate::remote::commands::{
    base_stack_commands, certbot_install_commands, shell_quote, wp_cli_install_commands,
    GLANCES_ENABLE, GLANCES_INSTALL, GLANCES_UNIT_PATH,
};
use crate::remote::templates::GLANCES_UNIT;
use crate::remote::Shell;
use crate::services::ServiceContext;
use crate::types::{AuthMethod, ServerAccess, ServerStatus};

/// Server bootstrap and key installation
pub struct ServerBootstrapService {
    ctx: Arc<ServiceContext>,
}

impl ServerBootstrapService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Install the server's key pair, switch to key login and install the base stack.
    ///
    /// Only connectivity and key installation are fatal; stack steps are best effort.
    pub async fn bootstrap(&self, access: &ServerAccess) -> CoreResult<()> {
        self.ctx
            .report_server(&access.address, ServerStatus::Configuring)
            .await;
        let result = self.run(access, true).await;
        self.ctx
            .finish_server(&access.address, "bootstrap", &result)
            .await;
        result
    }

    /// Install (or re-install) the key pair and verify key login; nothing else.
    pub async fn install_key(&self, access: &ServerAccess) -> CoreResult<()> {
        self.ctx
            .report_server(&access.address, ServerStatus::Configuring)
            .await;
        let result = self.run(access, false).await;
        self.ctx
            .finish_server(&access.address, "install key", &result)
            .await;
        result
    }

    async fn run(&self, access: &ServerAccess, with_stack: bool) -> CoreResult<()> {
        let shell = self.switch_to_key_login(access).await?;
        let result = if with_stack {
            self.install_base_stack(&shell).await
        } else {
            Ok(())
        };
        shell.close().await;
        result
    }

    /// Password session -> install public key -> key session.
    async fn switch_to_key_login(&self, access: &ServerAccess) -> CoreResult<Shell> {
        let target = access.target();
        let mut shell = self
            .ctx
            .open_shell(&target, &AuthMethod::Password(access.password.clone()))
            .await?;
        shell.add_secret(access.password.clone());

        let installed = self.install_public_key(&shell).await;
        shell.close().await;
        installed?;

        let shell = self.ctx.open_shell(&target, &AuthMethod::KeyPair).await?;
        log::info!("[{}] Key login verified", access.address);
        Ok(shell)
    }

    async fn install_public_key(&self, shell: &Shell) -> CoreResult<()> {
        let key = self.ctx.keys.get_or_create(shell.host()).await?;
        let public = shell_quote(key.public_openssh.trim());
        shell
            .check_all(&[
                "mkdir -p ~/.ssh && chmod 700 ~/.ssh".to_string(),
                format!(
                    "grep -qxF {public} ~/.ssh/authorized_keys 2>/dev/null || echo {public} >> ~/.ssh/authorized_keys"
                ),
                "chmod 600 ~/.ssh/authorized_keys".to_string(),
            ])
            .await
    }

    async fn install_base_stack(&self, shell: &Shell) -> CoreResult<()> {
        let mut failed = shell.attempt_all(&base_stack_commands()).await?;
        failed += shell
            .attempt_all(&wp_cli_install_commands(&self.ctx.settings))
            .await?;
        failed += shell.attempt_all(&certbot_install_commands()).await?;

        failed += shell.attempt_all(&[GLANCES_INSTALL]).await?;
        if let Err(e) = shell
            .put_file(GLANCES_UNIT.as_bytes(), GLANCES_UNIT_PATH)
            .await
        {
            if e.is_transport() {
                return Err(e);
            }
            log::warn!("[{}] Failed to write glances unit: {e}", shell.host());
            failed += 1;
        }
        failed += shell.attempt_all(GLANCES_ENABLE).await?;

        if failed > 0 {
            log::warn!("[{}] Base stack installed with {failed} failed step(s)", shell.host());
        } else {
            log::info!("[{}] Base stack installed", shell.host());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::TestHarness;

    fn access() -> ServerAccess {
        ServerAccess {
            address: "10.0.0.5".to_string(),
            port: 22,
            login: "root".to_string(),
            password: "initial-root-pw".to_string(),
        }
    }

    #[tokio::test]
    async fn fresh_host_ends_added() {
        let h = TestHarness::new();
        let service = ServerBootstrapService::new(h.ctx.clone());

        service.bootstrap(&access()).await.unwrap();

        assert_eq!(
            h.reporter.server_statuses("10.0.0.5").await,
            vec![ServerStatus::Configuring, ServerStatus::Added]
        );
        assert_eq!(
            h.executor.opened_with("10.0.0.5"),
            vec![
                AuthMethod::Password("initial-root-pw".to_string()),
                AuthMethod::KeyPair
            ]
        );
        assert_eq!(h.executor.close_count("10.0.0.5"), 2);
        assert!(h.executor.ran("10.0.0.5", "ssh-ed25519 AAAAC3NzaMock0"));
        assert!(h.executor.ran("10.0.0.5", "dnf install -y -q mysql-server"));
        assert!(h
            .executor
            .file_contents("10.0.0.5", GLANCES_UNIT_PATH)
            .is_some());
    }

    #[tokio::test]
    async fn unreachable_host_ends_error_without_steps() {
        let h = TestHarness::new();
        h.executor.set_unreachable("10.0.0.5");
        let service = ServerBootstrapService::new(h.ctx.clone());

        let err = service.bootstrap(&access()).await.unwrap_err();

        assert!(matches!(err, CoreError::Connect { .. }));
        assert_eq!(
            h.reporter.server_statuses("10.0.0.5").await,
            vec![ServerStatus::Configuring, ServerStatus::Error]
        );
        assert!(h.executor.events("10.0.0.5").is_empty());
        assert_eq!(h.keys.generated(), 0);
    }

    #[tokio::test]
    async fn failing_stack_steps_are_skipped() {
        let h = TestHarness::new();
        h.executor.fail_matching("setenforce", "setenforce: SELinux is disabled");
        h.executor.fail_matching("glances", "No match for argument: glances");
        let service = ServerBootstrapService::new(h.ctx.clone());

        service.bootstrap(&access()).await.unwrap();

        assert_eq!(
            h.reporter.server_statuses("10.0.0.5").await.last(),
            Some(&ServerStatus::Added)
        );
        assert!(h.executor.ran("10.0.0.5", "systemctl restart httpd"));
    }

    #[tokio::test]
    async fn rejected_key_login_is_fatal() {
        let h = TestHarness::new();
        h.executor.reject_key_login("10.0.0.5");
        let service = ServerBootstrapService::new(h.ctx.clone());

        assert!(service.bootstrap(&access()).await.is_err());
        assert!(!h.executor.ran("10.0.0.5", "dnf update"));
        assert_eq!(
            h.reporter.server_statuses("10.0.0.5").await.last(),
            Some(&ServerStatus::Error)
        );
    }

    #[tokio::test]
    async fn install_key_reuses_existing_pair() {
        let h = TestHarness::new();
        let service = ServerBootstrapService::new(h.ctx.clone());

        service.install_key(&access()).await.unwrap();
        service.install_key(&access()).await.unwrap();

        assert_eq!(h.keys.generated(), 1);
        assert!(!h.executor.ran("10.0.0.5", "dnf"));
        assert_eq!(h.executor.count_matching("10.0.0.5", "grep -qxF"), 2);
    }

    #[tokio::test]
    async fn password_never_reaches_commands() {
        let h = TestHarness::new();
        let service = ServerBootstrapService::new(h.ctx.clone());
        service.bootstrap(&access()).await.unwrap();
        assert!(!h.executor.ran("10.0.0.5", "initial-root-pw"));
    }
}
