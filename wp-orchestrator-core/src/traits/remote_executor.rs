//! Remote execution abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{AuthMethod, CommandOutput, HostTarget};

/// Opens authenticated shell sessions.
///
/// Implementations:
/// - `SshExecutor` (russh) in the app crate, resolving `AuthMethod::KeyPair`
///   through an injected `KeyRepository`
/// - `MockExecutor` in tests
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Connect and authenticate.
    ///
    /// Fails with `CoreError::Connect` when the host is unreachable, the
    /// credentials are rejected or no key pair exists for the host.
    async fn open(
        &self,
        target: &HostTarget,
        auth: &AuthMethod,
    ) -> CoreResult<Box<dyn RemoteSession>>;
}

/// One open session. Not shared between workflows.
///
/// The session does not interpret command semantics: `run` returns whatever
/// the command produced and only fails when the transport does.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Run a command to completion.
    async fn run(&self, command: &str) -> CoreResult<CommandOutput>;

    /// Write `contents` to `remote_path`, replacing the file.
    async fn put_file(&self, contents: &[u8], remote_path: &str) -> CoreResult<()>;

    /// Read a remote file.
    async fn read_file(&self, remote_path: &str) -> CoreResult<Vec<u8>>;

    /// Disconnect. Called exactly once, on every exit path.
    async fn close(&self) -> CoreResult<()>;
}
