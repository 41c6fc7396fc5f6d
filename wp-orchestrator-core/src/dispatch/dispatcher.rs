//! 任务分发：记录 → 排队 → 有界并发执行

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};

use super::WorkflowRunner;
use crate::error::CoreResult;
use crate::services::log_failure;
use crate::traits::TaskJournal;
use crate::types::{ServerStatus, SiteStatus, StatusTarget, TaskId, TaskRecord, WorkflowInvocation};

/// Accepts invocations and runs them in the background.
///
/// Every accepted task is journaled before it is queued and removed from the
/// journal once its workflow returned, so a crash leaves it for [`replay`].
/// At most `concurrency` workflows run at a time.
///
/// [`replay`]: TaskDispatcher::replay
#[derive(Clone)]
pub struct TaskDispatcher {
    runner: WorkflowRunner,
    journal: Arc<dyn TaskJournal>,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl TaskDispatcher {
    #[must_use]
    pub fn new(runner: WorkflowRunner, journal: Arc<dyn TaskJournal>, concurrency: usize) -> Self {
        Self {
            runner,
            journal,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Validate, journal and queue an invocation. Returns without waiting for it.
    pub async fn dispatch(&self, invocation: WorkflowInvocation) -> CoreResult<TaskId> {
        invocation.validate()?;
        let record = TaskRecord::new(invocation);
        log::info!("Task {} accepted: {}", record.id, record.invocation.name());
        self.start(record).await
    }

    /// Queue every task the journal still holds. Returns how many were queued.
    pub async fn replay(&self) -> CoreResult<usize> {
        let pending = self.journal.pending().await?;
        let count = pending.len();
        for record in pending {
            log::warn!(
                "Replaying task {} ({}), started {} times before",
                record.id,
                record.invocation.name(),
                record.attempts
            );
            self.start(record).await?;
        }
        Ok(count)
    }

    /// Tasks queued or running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until no task is queued or running.
    pub async fn drain(&self) {
        loop {
            let idle = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    async fn start(&self, mut record: TaskRecord) -> CoreResult<TaskId> {
        record.attempts += 1;
        self.journal.record(&record).await?;
        let id = record.id.clone();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let this = self.clone();
        tokio::spawn(async move {
            this.execute(record).await;
            if this.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                this.idle.notify_waiters();
            }
        });
        Ok(id)
    }

    async fn execute(&self, record: TaskRecord) {
        let Ok(_permit) = Arc::clone(&self.permits).acquire_owned().await else {
            log::error!("Worker pool closed, task {} left in the journal", record.id);
            return;
        };

        let name = record.invocation.name();
        let runner = self.runner.clone();
        let invocation = record.invocation.clone();
        // 工作流在独立任务中运行，panic 只会在 join 时体现为错误
        let outcome = tokio::spawn(async move { runner.run(&invocation).await }).await;
        match outcome {
            Ok(Ok(())) => log::info!("Task {} ({name}) finished", record.id),
            Ok(Err(e)) => log_failure(record.id.as_str(), name, &e),
            Err(join_error) => {
                log::error!("Task {} ({name}) aborted: {join_error}", record.id);
                self.mark_failed(record.invocation.status_target()).await;
            }
        }

        if let Err(e) = self.journal.complete(&record.id).await {
            log::error!("Failed to remove task {} from the journal: {e}", record.id);
        }
    }

    /// Report `error` for a workflow that died before reporting itself.
    async fn mark_failed(&self, target: StatusTarget) {
        let ctx = self.runner.context();
        match target {
            StatusTarget::Server(server) => ctx.report_server(&server, ServerStatus::Error).await,
            StatusTarget::Site(domain) => ctx.report_site(&domain, SiteStatus::Error, None).await,
            StatusTarget::Sites(domains) => {
                for domain in domains {
                    ctx.report_site(&domain, SiteStatus::Error, None).await;
                }
            }
            StatusTarget::None => {}
        }
    }
}
