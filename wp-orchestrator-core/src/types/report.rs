//! 域名报表行

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One site in the mailed domain report.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainReportRow {
    pub domain: String,
    pub server_ip: String,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub wp_login: Option<String>,
    #[serde(default)]
    pub wp_password: Option<String>,
}

impl std::fmt::Debug for DomainReportRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainReportRow")
            .field("domain", &self.domain)
            .field("server_ip", &self.server_ip)
            .field("added_at", &self.added_at)
            .field("wp_login", &self.wp_login)
            .field("wp_password", &self.wp_password.as_ref().map(|_| "****"))
            .finish()
    }
}
