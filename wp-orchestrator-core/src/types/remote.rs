//! 远程命令输出与密钥材料

use serde::{Deserialize, Serialize};

/// Captured result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the channel closed without reporting an exit status
    pub exit_status: Option<u32>,
}

impl CommandOutput {
    /// Exit status 0 and nothing on stderr.
    pub fn is_success(&self) -> bool {
        self.exited_ok() && self.stderr.trim().is_empty()
    }

    /// Exit status 0, whatever stderr says.
    ///
    /// For tools that print progress to stderr (certbot, wp-cli warnings).
    pub fn exited_ok(&self) -> bool {
        self.exit_status == Some(0)
    }

    /// Short description of why the command counts as failed.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.exit_status, stderr.is_empty()) {
            (Some(code), true) => format!("exit status {code}"),
            (Some(code), false) => format!("exit status {code}: {stderr}"),
            (None, true) => "no exit status".to_string(),
            (None, false) => stderr.to_string(),
        }
    }
}

/// One server's key pair in OpenSSH encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub private_openssh: String,
    /// `ssh-ed25519 AAAA... comment`, ready for `authorized_keys`
    pub public_openssh: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_openssh", &"****")
            .field("public_openssh", &self.public_openssh)
            .finish()
    }
}
