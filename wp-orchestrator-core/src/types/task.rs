//! 工作流调用与任务记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wp_orchestrator_provider::{RegistrarCredentials, SslMode, ZoneCredentials};

use super::{DomainReportRow, HostTarget, ServerAccess};
use crate::error::{CoreError, CoreResult};

/// One workflow invocation with every parameter it needs.
///
/// Serialized with a `workflow` tag:
/// `{"workflow": "change_theme", "server": {...}, "domain": "...", "theme": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "workflow", rename_all = "snake_case")]
pub enum WorkflowInvocation {
    // ===== 服务器 =====
    BootstrapServer {
        server: ServerAccess,
    },
    InstallKey {
        server: ServerAccess,
    },
    InstallCertbot {
        server: HostTarget,
    },
    InstallWpCli {
        server: HostTarget,
    },
    Reboot {
        server: HostTarget,
    },
    DisableSelinux {
        server: HostTarget,
    },
    RestartApache {
        server: HostTarget,
    },
    IssueCertificates {
        server: HostTarget,
        domains: Vec<String>,
    },

    // ===== 站点 =====
    InstallWordpress {
        server: HostTarget,
        domain: String,
        keyword: String,
    },
    NewAdmin {
        server: HostTarget,
        domain: String,
    },
    DeletePosts {
        server: HostTarget,
        domain: String,
    },
    ConfigureHttp {
        server: HostTarget,
        domain: String,
    },
    InstallPlugins {
        server: HostTarget,
        domain: String,
    },
    BulkInstallPlugin {
        server: HostTarget,
        domains: Vec<String>,
        plugin: String,
    },
    BulkDeletePlugin {
        server: HostTarget,
        domains: Vec<String>,
        plugin: String,
    },
    ChangeTheme {
        server: HostTarget,
        domain: String,
        theme: String,
    },
    GeneratePosts {
        server: HostTarget,
        domain: String,
        keyword: String,
        count: u32,
    },
    AddContactForm {
        server: HostTarget,
        domain: String,
        keyword: String,
    },
    TransferSite {
        source: HostTarget,
        destination: HostTarget,
        domain: String,
    },
    TeardownSite {
        server: HostTarget,
        domain: String,
    },
    TeardownServerSites {
        server: HostTarget,
        domains: Vec<String>,
    },

    // ===== DNS =====
    AttachDomain {
        account: ZoneCredentials,
        domain: String,
        #[serde(default)]
        registrar: Option<RegistrarCredentials>,
    },
    PointDomain {
        account: ZoneCredentials,
        domain: String,
        server_ip: String,
    },
    RepointDomain {
        account: ZoneCredentials,
        domain: String,
        server_ip: String,
        ssl_mode: SslMode,
    },

    // ===== 报表 =====
    SendDomainReport {
        recipient: String,
        rows: Vec<DomainReportRow>,
    },
}

/// The entity whose status a workflow drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTarget {
    Server(String),
    Site(String),
    /// Bulk workflows drive each site independently
    Sites(Vec<String>),
    /// DNS and report tasks have no status of their own
    None,
}

impl WorkflowInvocation {
    /// Wire name, as in the `workflow` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BootstrapServer { .. } => "bootstrap_server",
            Self::InstallKey { .. } => "install_key",
            Self::InstallCertbot { .. } => "install_certbot",
            Self::InstallWpCli { .. } => "install_wp_cli",
            Self::Reboot { .. } => "reboot",
            Self::DisableSelinux { .. } => "disable_selinux",
            Self::RestartApache { .. } => "restart_apache",
            Self::IssueCertificates { .. } => "issue_certificates",
            Self::InstallWordpress { .. } => "install_wordpress",
            Self::NewAdmin { .. } => "new_admin",
            Self::DeletePosts { .. } => "delete_posts",
            Self::ConfigureHttp { .. } => "configure_http",
            Self::InstallPlugins { .. } => "install_plugins",
            Self::BulkInstallPlugin { .. } => "bulk_install_plugin",
            Self::BulkDeletePlugin { .. } => "bulk_delete_plugin",
            Self::ChangeTheme { .. } => "change_theme",
            Self::GeneratePosts { .. } => "generate_posts",
            Self::AddContactForm { .. } => "add_contact_form",
            Self::TransferSite { .. } => "transfer_site",
            Self::TeardownSite { .. } => "teardown_site",
            Self::TeardownServerSites { .. } => "teardown_server_sites",
            Self::AttachDomain { .. } => "attach_domain",
            Self::PointDomain { .. } => "point_domain",
            Self::RepointDomain { .. } => "repoint_domain",
            Self::SendDomainReport { .. } => "send_domain_report",
        }
    }

    /// Entity to mark `error` if the workflow dies without reporting.
    pub fn status_target(&self) -> StatusTarget {
        match self {
            Self::BootstrapServer { server } | Self::InstallKey { server } => {
                StatusTarget::Server(server.address.clone())
            }
            Self::InstallCertbot { server }
            | Self::InstallWpCli { server }
            | Self::Reboot { server }
            | Self::DisableSelinux { server }
            | Self::RestartApache { server }
            | Self::IssueCertificates { server, .. } => {
                StatusTarget::Server(server.address.clone())
            }
            Self::InstallWordpress { domain, .. }
            | Self::NewAdmin { domain, .. }
            | Self::DeletePosts { domain, .. }
            | Self::ConfigureHttp { domain, .. }
            | Self::InstallPlugins { domain, .. }
            | Self::ChangeTheme { domain, .. }
            | Self::GeneratePosts { domain, .. }
            | Self::AddContactForm { domain, .. }
            | Self::TransferSite { domain, .. }
            | Self::TeardownSite { domain, .. } => StatusTarget::Site(domain.clone()),
            Self::BulkInstallPlugin { domains, .. }
            | Self::BulkDeletePlugin { domains, .. }
            | Self::TeardownServerSites { domains, .. } => StatusTarget::Sites(domains.clone()),
            Self::AttachDomain { .. }
            | Self::PointDomain { .. }
            | Self::RepointDomain { .. }
            | Self::SendDomainReport { .. } => StatusTarget::None,
        }
    }

    /// Reject parameters that would end up unquoted in a remote command.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            Self::IssueCertificates { domains, .. }
            | Self::TeardownServerSites { domains, .. } => require_domains(domains),
            Self::BulkInstallPlugin {
                domains, plugin, ..
            }
            | Self::BulkDeletePlugin {
                domains, plugin, ..
            } => {
                require_domains(domains)?;
                require_slug("plugin", plugin)
            }
            Self::ChangeTheme { domain, theme, .. } => {
                require_domain(domain)?;
                require_slug("theme", theme)
            }
            Self::GeneratePosts { domain, count, .. } => {
                require_domain(domain)?;
                if *count == 0 {
                    return Err(CoreError::ValidationError(
                        "count must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
            Self::InstallWordpress { domain, .. }
            | Self::NewAdmin { domain, .. }
            | Self::DeletePosts { domain, .. }
            | Self::ConfigureHttp { domain, .. }
            | Self::InstallPlugins { domain, .. }
            | Self::AddContactForm { domain, .. }
            | Self::TransferSite { domain, .. }
            | Self::TeardownSite { domain, .. }
            | Self::AttachDomain { domain, .. }
            | Self::PointDomain { domain, .. }
            | Self::RepointDomain { domain, .. } => require_domain(domain),
            Self::SendDomainReport { recipient, .. } => {
                if recipient.contains('@') {
                    Ok(())
                } else {
                    Err(CoreError::ValidationError(format!(
                        "invalid recipient: {recipient}"
                    )))
                }
            }
            Self::BootstrapServer { .. }
            | Self::InstallKey { .. }
            | Self::InstallCertbot { .. }
            | Self::InstallWpCli { .. }
            | Self::Reboot { .. }
            | Self::DisableSelinux { .. }
            | Self::RestartApache { .. } => Ok(()),
        }
    }
}

/// Hostname characters only: lowercase letters, digits, `-` and `.`.
pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.len() <= 253
        && domain.contains('.')
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-'])
        && domain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}

/// wordpress.org plugin/theme slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn require_domain(domain: &str) -> CoreResult<()> {
    if is_valid_domain(domain) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!("invalid domain: {domain}")))
    }
}

fn require_domains(domains: &[String]) -> CoreResult<()> {
    if domains.is_empty() {
        return Err(CoreError::ValidationError(
            "domains must not be empty".to_string(),
        ));
    }
    domains.iter().try_for_each(|d| require_domain(d))
}

fn require_slug(field: &str, slug: &str) -> CoreResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!("invalid {field}: {slug}")))
    }
}

/// Task identifier (UUID v4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An accepted invocation, as kept in the journal until it finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub invocation: WorkflowInvocation,
    pub accepted_at: DateTime<Utc>,
    /// Times the task was started, replays included
    #[serde(default)]
    pub attempts: u32,
}

impl TaskRecord {
    pub fn new(invocation: WorkflowInvocation) -> Self {
        Self {
            id: TaskId::new(),
            invocation,
            accepted_at: Utc::now(),
            attempts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_invocation() {
        let json = r#"{
            "workflow": "change_theme",
            "server": {"address": "10.0.0.5"},
            "domain": "my-site.com",
            "theme": "astra"
        }"#;
        let invocation: WorkflowInvocation = serde_json::from_str(json).unwrap();
        assert_eq!(invocation.name(), "change_theme");
        assert_eq!(
            invocation.status_target(),
            StatusTarget::Site("my-site.com".to_string())
        );
        invocation.validate().unwrap();
    }

    #[test]
    fn name_matches_serde_tag() {
        let invocation = WorkflowInvocation::InstallWpCli {
            server: HostTarget::new("10.0.0.5"),
        };
        let json = serde_json::to_value(&invocation).unwrap();
        assert_eq!(json["workflow"], invocation.name());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        let invocation = WorkflowInvocation::TeardownSite {
            server: HostTarget::new("10.0.0.5"),
            domain: "example.com; rm -rf /".to_string(),
        };
        assert!(matches!(
            invocation.validate(),
            Err(CoreError::ValidationError(_))
        ));

        let invocation = WorkflowInvocation::BulkInstallPlugin {
            server: HostTarget::new("10.0.0.5"),
            domains: vec!["a.com".to_string()],
            plugin: "jetpack$(id)".to_string(),
        };
        assert!(invocation.validate().is_err());
    }

    #[test]
    fn rejects_empty_batches_and_zero_posts() {
        let invocation = WorkflowInvocation::IssueCertificates {
            server: HostTarget::new("10.0.0.5"),
            domains: vec![],
        };
        assert!(invocation.validate().is_err());

        let invocation = WorkflowInvocation::GeneratePosts {
            server: HostTarget::new("10.0.0.5"),
            domain: "a.com".to_string(),
            keyword: "gardening".to_string(),
            count: 0,
        };
        assert!(invocation.validate().is_err());
    }

    #[test]
    fn domain_rules() {
        assert!(is_valid_domain("my-site.com"));
        assert!(is_valid_domain("shop.example.co.uk"));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("Example.com"));
        assert!(!is_valid_domain("-bad.com"));
        assert!(!is_valid_domain("a.com/../etc"));
    }

    #[test]
    fn bulk_targets_every_site() {
        let invocation = WorkflowInvocation::TeardownServerSites {
            server: HostTarget::new("10.0.0.5"),
            domains: vec!["a.com".to_string(), "b.com".to_string()],
        };
        assert_eq!(
            invocation.status_target(),
            StatusTarget::Sites(vec!["a.com".to_string(), "b.com".to_string()])
        );
    }
}
