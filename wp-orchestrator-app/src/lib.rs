//! Application bootstrap for WP Orchestrator.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection), plus the concrete adapters in [`adapters`].

pub mod adapters;

use std::sync::Arc;

use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::outbox::DEFAULT_MAX_ATTEMPTS;
use wp_orchestrator_core::traits::{
    ContentGenerator, DnsProviderFactory, HttpDnsProviderFactory, InMemoryTaskJournal,
    KeyRepository, RemoteExecutor, ReportMailer, StatusReporter, TaskJournal,
};
use wp_orchestrator_core::types::WorkflowSettings;
use wp_orchestrator_core::{ServiceContext, StatusOutbox, TaskDispatcher, WorkflowRunner};

/// Workflows run at the same time when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Application state.
///
/// Holds the `ServiceContext`, the task dispatcher and the status outbox every
/// workflow reports through. Constructed once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Task intake
    pub dispatcher: TaskDispatcher,
    outbox: Arc<StatusOutbox>,
}

impl AppState {
    /// Run the startup sequence: replay whatever the journal still holds.
    ///
    /// Returns how many tasks were replayed.
    pub async fn run_startup(&self) -> CoreResult<usize> {
        let replayed = self.dispatcher.replay().await?;
        if replayed > 0 {
            log::warn!("Replayed {replayed} unfinished tasks from the journal");
        } else {
            log::info!("Task journal is empty, nothing to replay");
        }
        Ok(replayed)
    }

    /// Status updates not yet delivered.
    pub fn pending_status_updates(&self) -> usize {
        self.outbox.pending()
    }

    /// Wait for running tasks, then for their status updates.
    pub async fn shutdown(&self) {
        log::info!(
            "Shutting down: {} tasks in flight",
            self.dispatcher.in_flight()
        );
        self.dispatcher.drain().await;
        self.outbox.flush().await;
        log::info!("All tasks finished and status updates delivered");
    }
}

/// Builder for constructing `AppState` with concrete adapters.
///
/// # Required adapters
/// - `executor`: remote shell sessions
/// - `key_repository`: per-server key pairs
/// - `status_reporter`: direct delivery to the system of record; wrapped in
///   a `StatusOutbox` by `build`
/// - `content_generator`: generated text and images
/// - `mailer`: report delivery
///
/// # Optional
/// - `dns_factory`: defaults to `HttpDnsProviderFactory`
/// - `journal`: defaults to `InMemoryTaskJournal`
/// - `settings`: defaults to `WorkflowSettings::default()`
/// - `concurrency`: defaults to [`DEFAULT_CONCURRENCY`]
/// - `status_max_attempts`: defaults to `DEFAULT_MAX_ATTEMPTS`
pub struct AppStateBuilder {
    executor: Option<Arc<dyn RemoteExecutor>>,
    key_repository: Option<Arc<dyn KeyRepository>>,
    status_reporter: Option<Arc<dyn StatusReporter>>,
    content_generator: Option<Arc<dyn ContentGenerator>>,
    mailer: Option<Arc<dyn ReportMailer>>,
    dns_factory: Option<Arc<dyn DnsProviderFactory>>,
    journal: Option<Arc<dyn TaskJournal>>,
    settings: WorkflowSettings,
    concurrency: usize,
    status_max_attempts: u32,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            executor: None,
            key_repository: None,
            status_reporter: None,
            content_generator: None,
            mailer: None,
            dns_factory: None,
            journal: None,
            settings: WorkflowSettings::default(),
            concurrency: DEFAULT_CONCURRENCY,
            status_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn RemoteExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    #[must_use]
    pub fn key_repository(mut self, keys: Arc<dyn KeyRepository>) -> Self {
        self.key_repository = Some(keys);
        self
    }

    #[must_use]
    pub fn status_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.status_reporter = Some(reporter);
        self
    }

    #[must_use]
    pub fn content_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.content_generator = Some(generator);
        self
    }

    #[must_use]
    pub fn mailer(mut self, mailer: Arc<dyn ReportMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    #[must_use]
    pub fn dns_factory(mut self, factory: Arc<dyn DnsProviderFactory>) -> Self {
        self.dns_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn journal(mut self, journal: Arc<dyn TaskJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn status_max_attempts(mut self, attempts: u32) -> Self {
        self.status_max_attempts = attempts;
        self
    }

    /// Build the `AppState`. Spawns the outbox delivery task, so it must be
    /// called inside a Tokio runtime.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing
    /// or the concurrency is zero.
    pub fn build(self) -> CoreResult<AppState> {
        let executor = self
            .executor
            .ok_or_else(|| CoreError::ValidationError("executor is required".to_string()))?;
        let key_repository = self.key_repository.ok_or_else(|| {
            CoreError::ValidationError("key_repository is required".to_string())
        })?;
        let status_reporter = self.status_reporter.ok_or_else(|| {
            CoreError::ValidationError("status_reporter is required".to_string())
        })?;
        let content_generator = self.content_generator.ok_or_else(|| {
            CoreError::ValidationError("content_generator is required".to_string())
        })?;
        let mailer = self
            .mailer
            .ok_or_else(|| CoreError::ValidationError("mailer is required".to_string()))?;
        if self.concurrency == 0 {
            return Err(CoreError::ValidationError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        let dns_factory = self
            .dns_factory
            .unwrap_or_else(|| Arc::new(HttpDnsProviderFactory));
        let journal = self
            .journal
            .unwrap_or_else(|| Arc::new(InMemoryTaskJournal::new()));

        let outbox = Arc::new(StatusOutbox::spawn(
            status_reporter,
            self.status_max_attempts,
        ));

        let ctx = Arc::new(ServiceContext::new(
            executor,
            key_repository,
            Arc::clone(&outbox) as Arc<dyn StatusReporter>,
            content_generator,
            dns_factory,
            mailer,
            self.settings,
        ));

        let dispatcher = TaskDispatcher::new(
            WorkflowRunner::new(Arc::clone(&ctx)),
            journal,
            self.concurrency,
        );

        Ok(AppState {
            ctx,
            dispatcher,
            outbox,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
