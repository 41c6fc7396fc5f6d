//! DNS 区域账户

use serde::{Deserialize, Serialize};

use wp_orchestrator_provider::ZoneCredentials;

/// Zone account status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZoneAccountStatus {
    Added,
    Error,
}

/// A DNS provider account, bound to at most one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAccount {
    pub id: String,
    pub credentials: ZoneCredentials,
    pub status: ZoneAccountStatus,
    /// Domain of the site using this account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_site: Option<String>,
}

impl ZoneAccount {
    /// Available iff unbound.
    pub fn is_available(&self) -> bool {
        self.bound_site.is_none()
    }

    /// First available account with a healthy status, in the given order.
    pub fn pick_available(accounts: &[ZoneAccount]) -> Option<&ZoneAccount> {
        accounts
            .iter()
            .find(|a| a.is_available() && a.status == ZoneAccountStatus::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, status: ZoneAccountStatus, bound: Option<&str>) -> ZoneAccount {
        ZoneAccount {
            id: id.to_string(),
            credentials: ZoneCredentials {
                email: format!("{id}@example.com"),
                api_key: "key".to_string(),
            },
            status,
            bound_site: bound.map(str::to_string),
        }
    }

    #[test]
    fn bound_accounts_are_unavailable() {
        assert!(account("a", ZoneAccountStatus::Added, None).is_available());
        assert!(!account("a", ZoneAccountStatus::Added, Some("example.com")).is_available());
    }

    #[test]
    fn pick_skips_bound_and_broken_accounts() {
        let accounts = vec![
            account("bound", ZoneAccountStatus::Added, Some("example.com")),
            account("broken", ZoneAccountStatus::Error, None),
            account("free", ZoneAccountStatus::Added, None),
        ];
        assert_eq!(ZoneAccount::pick_available(&accounts).unwrap().id, "free");
        assert!(ZoneAccount::pick_available(&accounts[..2]).is_none());
    }
}
