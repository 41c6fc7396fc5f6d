//! WP Orchestrator worker
//!
//! Loads configuration, installs logging, builds the application state,
//! replays unfinished tasks and serves the task intake endpoint.

mod config;
mod logging;
mod routes;

use std::process::ExitCode;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use wp_orchestrator_app::adapters::{
    FileKeyRepository, HttpStatusReporter, JsonTaskJournal, SmtpReportMailer, SmtpSettings,
    SshExecutor,
};
use wp_orchestrator_app::{AppState, AppStateBuilder};
use wp_orchestrator_core::traits::{InMemoryTaskJournal, KeyRepository, TaskJournal};
use wp_orchestrator_provider::{GeneratorSettings, StatusApiClient, create_content_generator};

use crate::config::{ConfigSource, WorkerConfig};

fn build_state(config: &WorkerConfig) -> anyhow::Result<AppState> {
    let keys: Arc<dyn KeyRepository> = Arc::new(FileKeyRepository::new(&config.keys.directory));
    let status_api = StatusApiClient::new(
        config.status_api.base_url.clone(),
        config.status_api.token.clone(),
    )
    .context("failed to create the status API client")?;
    let generator = create_content_generator(GeneratorSettings {
        api_key: config.generator.api_key.clone(),
        base_url: config.generator.base_url.clone(),
        text_model: config.generator.text_model.clone(),
        image_model: config.generator.image_model.clone(),
    })
    .context("failed to create the content generator")?;
    let mailer = SmtpReportMailer::new(SmtpSettings {
        host: config.mail.smtp_host.clone(),
        port: config.mail.smtp_port,
        username: config.mail.username.clone(),
        password: config.mail.password.clone(),
        from: config.mail.from.clone(),
    })
    .context("failed to create the report mailer")?;
    let journal: Arc<dyn TaskJournal> = match &config.worker.journal_path {
        Some(path) => Arc::new(JsonTaskJournal::new(path)),
        None => {
            tracing::warn!("No journal_path configured, accepted tasks are lost on restart");
            Arc::new(InMemoryTaskJournal::new())
        }
    };

    let state = AppStateBuilder::new()
        .executor(Arc::new(SshExecutor::new(Arc::clone(&keys))))
        .key_repository(keys)
        .status_reporter(Arc::new(HttpStatusReporter::new(status_api)))
        .content_generator(generator)
        .mailer(Arc::new(mailer))
        .journal(journal)
        .settings(config.workflow_settings())
        .concurrency(config.worker.concurrency)
        .status_max_attempts(config.status_api.max_attempts)
        .build()?;
    Ok(state)
}

async fn run(config: WorkerConfig) -> anyhow::Result<()> {
    let state = web::Data::new(build_state(&config)?);
    state
        .run_startup()
        .await
        .context("failed to replay the task journal")?;

    tracing::info!(
        "Listening on {} with {} workflow slots",
        config.worker.listen,
        config.worker.concurrency
    );
    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(&config.worker.listen)
    .with_context(|| format!("failed to bind {}", config.worker.listen))?
    .run()
    .await
    .context("HTTP server failed")?;

    // 停止接收后等待在途任务及其状态上报
    state.shutdown().await;
    Ok(())
}

#[actix_web::main]
async fn main() -> ExitCode {
    let (config, source) = match WorkerConfig::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match &source {
        ConfigSource::File(path) => tracing::info!("Configuration loaded from {}", path.display()),
        ConfigSource::Defaults => tracing::info!("No configuration file, using defaults"),
    }

    if let Err(e) = run(config).await {
        tracing::error!("Worker stopped: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
