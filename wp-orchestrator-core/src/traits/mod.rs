//! Abstractions over remote hosts, storage and outbound services

mod dns_provider_factory;
mod key_repository;
mod remote_executor;
mod report_mailer;
mod status_reporter;
mod task_journal;

pub use dns_provider_factory::{DnsProviderFactory, HttpDnsProviderFactory};
pub use key_repository::KeyRepository;
pub use remote_executor::{RemoteExecutor, RemoteSession};
pub use report_mailer::{ReportMail, ReportMailer};
pub use status_reporter::StatusReporter;
pub use task_journal::{InMemoryTaskJournal, TaskJournal};

// Re-export provider 库的 Trait
pub use wp_orchestrator_provider::{ContentGenerator, Registrar, ZoneProvider};
