//! 状态上报发件箱
//!
//! 工作流只负责入队；后台任务按入队顺序逐条投递，失败时指数退避重试。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use wp_orchestrator_provider::backoff_delay;

use crate::error::{CoreError, CoreResult};
use crate::traits::StatusReporter;
use crate::types::{CompletedStep, ServerStatus, SiteStatus};

/// Attempts per update when none are configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// One queued status update.
enum StatusUpdate {
    Server {
        server: String,
        status: ServerStatus,
    },
    Site {
        domain: String,
        status: SiteStatus,
        step: Option<CompletedStep>,
    },
    Credentials {
        domain: String,
        login: String,
        password: String,
    },
}

impl std::fmt::Debug for StatusUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server { server, status } => write!(f, "server {server} -> {}", status.as_str()),
            Self::Site {
                domain,
                status,
                step,
            } => {
                write!(f, "site {domain} -> {}", status.as_str())?;
                if let Some(step) = step {
                    write!(f, " ({})", step.as_str())?;
                }
                Ok(())
            }
            Self::Credentials { domain, login, .. } => {
                write!(f, "credentials {domain} ({login}, ****)")
            }
        }
    }
}

impl StatusUpdate {
    async fn deliver(&self, reporter: &dyn StatusReporter) -> CoreResult<()> {
        match self {
            Self::Server { server, status } => reporter.set_server_status(server, *status).await,
            Self::Site {
                domain,
                status,
                step,
            } => reporter.set_site_status(domain, *status, *step).await,
            Self::Credentials {
                domain,
                login,
                password,
            } => reporter.set_site_credentials(domain, login, password).await,
        }
    }
}

/// At-least-once delivery of status updates.
///
/// Implements [`StatusReporter`] itself: calls return as soon as the update
/// is queued. A single background task delivers updates in the order they
/// were queued, so the updates of one entity never overtake each other.
/// An update that still fails after `max_attempts` is logged and dropped.
pub struct StatusOutbox {
    sender: mpsc::UnboundedSender<StatusUpdate>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl StatusOutbox {
    /// Start the delivery task. Must be called inside a Tokio runtime.
    pub fn spawn(inner: Arc<dyn StatusReporter>, max_attempts: u32) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());
        tokio::spawn(deliver_loop(
            inner,
            receiver,
            max_attempts.max(1),
            Arc::clone(&pending),
            Arc::clone(&idle),
        ));
        Self {
            sender,
            pending,
            idle,
        }
    }

    /// Updates queued or being delivered.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every queued update was delivered or dropped.
    pub async fn flush(&self) {
        loop {
            let idle = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            idle.await;
        }
    }

    fn enqueue(&self, update: StatusUpdate) -> CoreResult<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.sender.send(update).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            CoreError::Reporting(format!("status outbox closed, lost {:?}", e.0))
        })
    }
}

async fn deliver_loop(
    inner: Arc<dyn StatusReporter>,
    mut receiver: mpsc::UnboundedReceiver<StatusUpdate>,
    max_attempts: u32,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
) {
    while let Some(update) = receiver.recv().await {
        deliver_with_retry(inner.as_ref(), &update, max_attempts).await;
        if pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            idle.notify_waiters();
        }
    }
    log::debug!("Status outbox closed");
}

async fn deliver_with_retry(reporter: &dyn StatusReporter, update: &StatusUpdate, max_attempts: u32) {
    for attempt in 1..=max_attempts {
        match update.deliver(reporter).await {
            Ok(()) => {
                if attempt > 1 {
                    log::info!("Delivered {update:?} on attempt {attempt}");
                }
                return;
            }
            Err(e) if attempt < max_attempts => {
                log::warn!("Delivering {update:?} failed (attempt {attempt}), retrying: {e}");
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
            Err(e) => {
                log::error!("Dropping {update:?} after {attempt} attempts: {e}");
            }
        }
    }
}

#[async_trait]
impl StatusReporter for StatusOutbox {
    async fn set_server_status(&self, server: &str, status: ServerStatus) -> CoreResult<()> {
        self.enqueue(StatusUpdate::Server {
            server: server.to_string(),
            status,
        })
    }

    async fn set_site_status(
        &self,
        domain: &str,
        status: SiteStatus,
        step: Option<CompletedStep>,
    ) -> CoreResult<()> {
        self.enqueue(StatusUpdate::Site {
            domain: domain.to_string(),
            status,
            step,
        })
    }

    async fn set_site_credentials(
        &self,
        domain: &str,
        login: &str,
        password: &str,
    ) -> CoreResult<()> {
        self.enqueue(StatusUpdate::Credentials {
            domain: domain.to_string(),
            login: login.to_string(),
            password: password.to_string(),
        })
    }
}
