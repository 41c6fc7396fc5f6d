//! Workflow-side wrapper around a [`RemoteSession`].

use std::time::Duration;

use wp_orchestrator_provider::truncate_for_log;

use crate::error::{CoreError, CoreResult};
use crate::traits::RemoteSession;
use crate::types::CommandOutput;

/// An open session plus the policy every workflow applies to it.
///
/// - every call is bounded by the command timeout; a timeout is a command failure
/// - [`check`](Self::check) is for load-bearing steps, [`attempt`](Self::attempt)
///   for steps that are logged and skipped on failure
/// - registered secrets are masked in logs and error messages
pub struct Shell {
    session: Box<dyn RemoteSession>,
    host: String,
    timeout: Duration,
    secrets: Vec<String>,
}

impl Shell {
    pub fn new(session: Box<dyn RemoteSession>, host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            session,
            host: host.into(),
            timeout,
            secrets: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Mask `secret` in everything this shell logs or returns as an error.
    pub fn add_secret(&mut self, secret: impl Into<String>) {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secrets.push(secret);
        }
    }

    fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), "****"))
    }

    fn timeout_error(&self, what: &str) -> CoreError {
        CoreError::Timeout {
            host: self.host.clone(),
            command: truncate_for_log(&self.redact(what)),
            secs: self.timeout.as_secs(),
        }
    }

    fn command_error(&self, command: &str, output: &CommandOutput) -> CoreError {
        CoreError::Command {
            host: self.host.clone(),
            command: truncate_for_log(&self.redact(command)),
            detail: truncate_for_log(&self.redact(&output.failure_detail())),
        }
    }

    /// Run a command and return its output, whatever it is.
    pub async fn run(&self, command: &str) -> CoreResult<CommandOutput> {
        log::debug!("[{}] $ {}", self.host, truncate_for_log(&self.redact(command)));
        match tokio::time::timeout(self.timeout, self.session.run(command)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(command)),
        }
    }

    /// Run a load-bearing command: non-zero exit or stderr output is an error.
    pub async fn check(&self, command: &str) -> CoreResult<CommandOutput> {
        let output = self.run(command).await?;
        if output.is_success() {
            Ok(output)
        } else {
            Err(self.command_error(command, &output))
        }
    }

    /// Like [`check`](Self::check), but only the exit status counts.
    ///
    /// For tools that write progress or warnings to stderr.
    pub async fn check_exit(&self, command: &str) -> CoreResult<CommandOutput> {
        let output = self.run(command).await?;
        if output.exited_ok() {
            if !output.stderr.trim().is_empty() {
                log::debug!(
                    "[{}] stderr: {}",
                    self.host,
                    truncate_for_log(&self.redact(&output.stderr))
                );
            }
            Ok(output)
        } else {
            Err(self.command_error(command, &output))
        }
    }

    /// Run a best-effort command.
    ///
    /// Returns `Ok(false)` when the command failed or timed out (logged),
    /// `Err` only when the session itself is gone.
    pub async fn attempt(&self, command: &str) -> CoreResult<bool> {
        match self.check(command).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_transport() => Err(e),
            Err(e) => {
                log::warn!("[{}] Step failed, continuing: {e}", self.host);
                Ok(false)
            }
        }
    }

    /// [`attempt`](Self::attempt) judged by exit status only.
    pub async fn attempt_exit(&self, command: &str) -> CoreResult<bool> {
        match self.check_exit(command).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_transport() => Err(e),
            Err(e) => {
                log::warn!("[{}] Step failed, continuing: {e}", self.host);
                Ok(false)
            }
        }
    }

    /// Run every command with [`attempt`](Self::attempt); returns how many failed.
    pub async fn attempt_all<S: AsRef<str>>(&self, commands: &[S]) -> CoreResult<usize> {
        let mut failed = 0;
        for command in commands {
            if !self.attempt(command.as_ref()).await? {
                failed += 1;
            }
        }
        Ok(failed)
    }

    /// Run every command with [`check`](Self::check), stopping at the first failure.
    pub async fn check_all<S: AsRef<str>>(&self, commands: &[S]) -> CoreResult<()> {
        for command in commands {
            self.check(command.as_ref()).await?;
        }
        Ok(())
    }

    pub async fn put_file(&self, contents: &[u8], remote_path: &str) -> CoreResult<()> {
        log::debug!("[{}] put {remote_path} ({} bytes)", self.host, contents.len());
        match tokio::time::timeout(self.timeout, self.session.put_file(contents, remote_path)).await
        {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(&format!("put {remote_path}"))),
        }
    }

    pub async fn read_file(&self, remote_path: &str) -> CoreResult<Vec<u8>> {
        log::debug!("[{}] read {remote_path}", self.host);
        match tokio::time::timeout(self.timeout, self.session.read_file(remote_path)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(&format!("read {remote_path}"))),
        }
    }

    pub async fn read_to_string(&self, remote_path: &str) -> CoreResult<String> {
        let bytes = self.read_file(remote_path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Close the session. Failures are logged; there is nothing left to do with them.
    pub async fn close(self) {
        if let Err(e) = self.session.close().await {
            log::warn!("[{}] Failed to close session: {e}", self.host);
        }
    }
}
