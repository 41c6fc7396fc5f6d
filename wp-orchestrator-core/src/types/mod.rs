//! 类型定义模块

mod remote;
mod report;
mod settings;
mod status;
mod target;
mod task;
mod zone;

pub use remote::{CommandOutput, KeyMaterial};
pub use report::DomainReportRow;
pub use settings::{WorkflowSettings, DEFAULT_PLUGINS, MAX_POST_STEP_DAYS};
pub use status::{CompletedStep, ServerStatus, SiteFlags, SiteStatus};
pub use target::{AuthMethod, HostTarget, ServerAccess};
pub use task::{
    is_valid_domain, is_valid_slug, StatusTarget, TaskId, TaskRecord, WorkflowInvocation,
};
pub use zone::{ZoneAccount, ZoneAccountStatus};

// Re-export provider 库的公共类型
pub use wp_orchestrator_provider::{
    GeneratedPost, NameServers, RegistrarCredentials, SslMode, ZoneCredentials,
};
