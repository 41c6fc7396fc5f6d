//! WP Orchestrator Core Library
//!
//! Provisioning engine for `WordPress` sites on managed servers:
//! - Remote shell helpers and command builders (`remote`)
//! - Provisioning workflows, one service per concern (`services`)
//! - Status outbox with at-least-once delivery (`outbox`)
//! - Journaled task dispatch with a bounded worker pool (`dispatch`)
//!
//! Remote hosts, key storage, status delivery and mail sit behind traits;
//! the app crate supplies the concrete adapters.

pub mod dispatch;
pub mod error;
pub mod outbox;
pub mod remote;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use dispatch::{TaskDispatcher, WorkflowRunner};
pub use error::{CoreError, CoreResult};
pub use outbox::StatusOutbox;
pub use services::ServiceContext;
pub use traits::{
    KeyRepository, RemoteExecutor, RemoteSession, ReportMailer, StatusReporter, TaskJournal,
};
