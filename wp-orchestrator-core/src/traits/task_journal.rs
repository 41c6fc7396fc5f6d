//! Task journal abstract Trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::{TaskId, TaskRecord};

/// Accepted-but-unfinished tasks.
///
/// A record is written before the task is queued and removed after the
/// workflow finished, so whatever is left after a crash is replayed on start-up.
/// Provides a default memory implementation of `InMemoryTaskJournal`.
#[async_trait]
pub trait TaskJournal: Send + Sync {
    /// Insert or overwrite a record
    async fn record(&self, task: &TaskRecord) -> CoreResult<()>;

    /// Remove a finished task. Unknown ids are ignored.
    async fn complete(&self, id: &TaskId) -> CoreResult<()>;

    /// All unfinished tasks, oldest first
    async fn pending(&self) -> CoreResult<Vec<TaskRecord>>;
}

/// In-memory task journal
///
/// Loses everything on restart; for tests and for running without a journal file.
#[derive(Clone, Default)]
pub struct InMemoryTaskJournal {
    tasks: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl InMemoryTaskJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskJournal for InMemoryTaskJournal {
    async fn record(&self, task: &TaskRecord) -> CoreResult<()> {
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn complete(&self, id: &TaskId) -> CoreResult<()> {
        self.tasks.write().await.remove(id);
        Ok(())
    }

    async fn pending(&self) -> CoreResult<Vec<TaskRecord>> {
        let mut tasks: Vec<TaskRecord> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.accepted_at);
        Ok(tasks)
    }
}
