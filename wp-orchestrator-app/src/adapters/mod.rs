//! Concrete adapters for the core traits.

mod file_key_repository;
mod http_status_reporter;
mod json_task_journal;
mod smtp_mailer;
mod ssh_executor;

pub use file_key_repository::FileKeyRepository;
pub use http_status_reporter::HttpStatusReporter;
pub use json_task_journal::JsonTaskJournal;
pub use smtp_mailer::{SmtpReportMailer, SmtpSettings};
pub use ssh_executor::SshExecutor;
