//! SSH remote executor (russh client)
//!
//! Every command runs on its own exec channel. Files go through the same
//! channels: `cat > path` with the contents on stdin, `cat path` to read.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key;

use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::remote::shell_quote;
use wp_orchestrator_core::traits::{KeyRepository, RemoteExecutor, RemoteSession};
use wp_orchestrator_core::types::{AuthMethod, CommandOutput, HostTarget};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Client handler. Fleet hosts are freshly provisioned, so host keys are
/// accepted on first use.
struct FleetClient {
    host: String,
}

#[async_trait]
impl client::Handler for FleetClient {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        log::debug!(
            "[{}] Accepting host key {}",
            self.host,
            server_public_key.fingerprint()
        );
        Ok(true)
    }
}

/// Opens russh sessions. Key-pair auth loads the server's key from the
/// injected [`KeyRepository`].
pub struct SshExecutor {
    keys: Arc<dyn KeyRepository>,
    config: Arc<client::Config>,
    connect_timeout: Duration,
}

impl SshExecutor {
    #[must_use]
    pub fn new(keys: Arc<dyn KeyRepository>) -> Self {
        let config = client::Config {
            keepalive_interval: Some(KEEPALIVE_INTERVAL),
            ..Default::default()
        };
        Self {
            keys,
            config: Arc::new(config),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    async fn authenticate(
        &self,
        handle: &mut Handle<FleetClient>,
        target: &HostTarget,
        auth: &AuthMethod,
    ) -> CoreResult<bool> {
        match auth {
            AuthMethod::Password(password) => handle
                .authenticate_password(target.login.as_str(), password.as_str())
                .await
                .map_err(|e| connect_error(&target.address, &e)),
            AuthMethod::KeyPair => {
                let material = self.keys.get(&target.address).await?.ok_or_else(|| {
                    connect_error(&target.address, &"no key pair stored for this server")
                })?;
                let key_pair = russh_keys::decode_secret_key(&material.private_openssh, None)
                    .map_err(|e| {
                        CoreError::KeyMaterial(format!(
                            "Stored key for {} is unreadable: {e}",
                            target.address
                        ))
                    })?;
                handle
                    .authenticate_publickey(target.login.as_str(), Arc::new(key_pair))
                    .await
                    .map_err(|e| connect_error(&target.address, &e))
            }
        }
    }
}

fn connect_error(host: &str, message: &dyn std::fmt::Display) -> CoreError {
    CoreError::Connect {
        host: host.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn open(
        &self,
        target: &HostTarget,
        auth: &AuthMethod,
    ) -> CoreResult<Box<dyn RemoteSession>> {
        let handler = FleetClient {
            host: target.address.clone(),
        };
        let connect = client::connect(
            Arc::clone(&self.config),
            (target.address.as_str(), target.port),
            handler,
        );
        let mut handle = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| {
                connect_error(
                    &target.address,
                    &format!("timed out after {}s", self.connect_timeout.as_secs()),
                )
            })?
            .map_err(|e| connect_error(&target.address, &e))?;

        if !self.authenticate(&mut handle, target, auth).await? {
            return Err(connect_error(
                &target.address,
                &format!("{auth:?} authentication rejected for {}", target.login),
            ));
        }

        log::debug!(
            "[{}] SSH session opened as {}",
            target.address,
            target.login
        );
        Ok(Box::new(SshSession {
            host: target.address.clone(),
            handle,
        }))
    }
}

/// What one exec channel produced, as raw bytes.
#[derive(Debug, Default)]
struct RawOutput {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
}

impl RawOutput {
    fn into_command_output(self) -> CommandOutput {
        CommandOutput {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            exit_status: self.exit_status,
        }
    }

    /// File operations only count when `cat` exited 0.
    fn require_success(self, host: &str, command: String) -> CoreResult<Vec<u8>> {
        if self.exit_status == Some(0) {
            return Ok(self.stdout);
        }
        let output = self.into_command_output();
        Err(CoreError::Command {
            host: host.to_string(),
            command,
            detail: output.failure_detail(),
        })
    }
}

struct SshSession {
    host: String,
    handle: Handle<FleetClient>,
}

impl SshSession {
    async fn exec(&self, command: &str, stdin: Option<&[u8]>) -> CoreResult<RawOutput> {
        let transport = |e: russh::Error| connect_error(&self.host, &e);

        let mut channel = self.handle.channel_open_session().await.map_err(transport)?;
        channel.exec(true, command).await.map_err(transport)?;
        if let Some(data) = stdin {
            channel.data(data).await.map_err(transport)?;
            channel.eof().await.map_err(transport)?;
        }

        let mut output = RawOutput::default();
        while let Some(message) = channel.wait().await {
            match message {
                ChannelMsg::Data { data } => output.stdout.extend_from_slice(&data),
                // ext 1 = stderr
                ChannelMsg::ExtendedData { data, ext: 1 } => {
                    output.stderr.extend_from_slice(&data);
                }
                ChannelMsg::ExitStatus { exit_status } => output.exit_status = Some(exit_status),
                _ => {}
            }
        }
        Ok(output)
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn run(&self, command: &str) -> CoreResult<CommandOutput> {
        Ok(self.exec(command, None).await?.into_command_output())
    }

    async fn put_file(&self, contents: &[u8], remote_path: &str) -> CoreResult<()> {
        let command = format!("cat > {}", shell_quote(remote_path));
        self.exec(&command, Some(contents))
            .await?
            .require_success(&self.host, command)?;
        Ok(())
    }

    async fn read_file(&self, remote_path: &str) -> CoreResult<Vec<u8>> {
        let command = format!("cat {}", shell_quote(remote_path));
        self.exec(&command, None)
            .await?
            .require_success(&self.host, command)
    }

    async fn close(&self) -> CoreResult<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| connect_error(&self.host, &e))?;
        log::debug!("[{}] SSH session closed", self.host);
        Ok(())
    }
}
