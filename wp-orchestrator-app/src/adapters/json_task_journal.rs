//! JSON file task journal.
//!
//! The whole journal is one JSON array, rewritten on every change through a
//! temporary file and a rename so a crash never leaves half a file behind.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::traits::TaskJournal;
use wp_orchestrator_core::types::{TaskId, TaskRecord};

const MAX_JOURNAL_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

pub struct JsonTaskJournal {
    path: PathBuf,
    /// In-memory copy, loaded on first use
    cache: Mutex<Option<HashMap<TaskId, TaskRecord>>>,
}

impl JsonTaskJournal {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    async fn load(&self) -> CoreResult<HashMap<TaskId, TaskRecord>> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Journal file does not exist: {}", self.path.display());
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(CoreError::Journal(format!(
                    "Failed to read journal metadata: {e}"
                )))
            }
        };
        if metadata.len() > MAX_JOURNAL_FILE_SIZE {
            return Err(CoreError::Journal(format!(
                "Journal file too large: {} bytes (max: {MAX_JOURNAL_FILE_SIZE} bytes)",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::Journal(format!("Failed to read journal: {e}")))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let records: Vec<TaskRecord> = serde_json::from_str(&content)
            .map_err(|e| CoreError::SerializationError(format!("Invalid journal format: {e}")))?;
        Ok(records.into_iter().map(|r| (r.id.clone(), r)).collect())
    }

    async fn persist(&self, tasks: &HashMap<TaskId, TaskRecord>) -> CoreResult<()> {
        let json = serde_json::to_vec_pretty(&sorted(tasks))
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Journal(format!("Failed to create journal directory: {e}")))?;
        }
        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| CoreError::Journal(format!("Failed to write journal: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::Journal(format!("Failed to replace journal: {e}")))
    }

    /// Apply `change` to the cached journal and write it through.
    async fn update(
        &self,
        change: impl FnOnce(&mut HashMap<TaskId, TaskRecord>) -> bool + Send,
    ) -> CoreResult<()> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        let Some(tasks) = cache.as_mut() else {
            return Ok(());
        };
        if change(tasks) {
            self.persist(tasks).await?;
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn sorted(tasks: &HashMap<TaskId, TaskRecord>) -> Vec<TaskRecord> {
    let mut records: Vec<TaskRecord> = tasks.values().cloned().collect();
    records.sort_by_key(|r| r.accepted_at);
    records
}

#[async_trait]
impl TaskJournal for JsonTaskJournal {
    async fn record(&self, task: &TaskRecord) -> CoreResult<()> {
        let task = task.clone();
        self.update(move |tasks| {
            tasks.insert(task.id.clone(), task);
            true
        })
        .await
    }

    async fn complete(&self, id: &TaskId) -> CoreResult<()> {
        self.update(|tasks| tasks.remove(id).is_some()).await
    }

    async fn pending(&self) -> CoreResult<Vec<TaskRecord>> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        Ok(cache.as_ref().map(sorted).unwrap_or_default())
    }
}
