//! Request/response types shared by the service clients.

use serde::{Deserialize, Serialize};

use crate::utils::log_sanitizer::mask_secret;

// ============ DNS zone provider ============

/// Credentials of one DNS zone account (Cloudflare global API key).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneCredentials {
    /// Account e-mail, sent as `X-Auth-Email`.
    pub email: String,
    /// Global API key, sent as `X-Auth-Key`.
    pub api_key: String,
}

impl std::fmt::Debug for ZoneCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneCredentials")
            .field("email", &self.email)
            .field("api_key", &mask_secret(&self.api_key))
            .finish()
    }
}

/// Zone activation state as reported by the DNS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    /// Nameservers are delegated; records are served.
    Active,
    /// Waiting for the registrar delegation.
    Pending,
    /// Zone was moved away or deleted.
    Moved,
    /// Anything else the provider reports.
    Unknown,
}

/// A zone as seen by the DNS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider zone ID.
    pub id: String,
    /// Apex domain.
    pub name: String,
    /// Activation state.
    pub status: ZoneStatus,
    /// Nameservers assigned to the zone.
    pub name_servers: Vec<String>,
}

/// The nameserver pair returned when a zone is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameServers {
    pub primary: String,
    pub secondary: String,
}

impl NameServers {
    /// Build from a provider list, which must contain at least two entries.
    pub fn from_list(list: &[String]) -> Option<Self> {
        match list {
            [primary, secondary, ..] => Some(Self {
                primary: primary.clone(),
                secondary: secondary.clone(),
            }),
            _ => None,
        }
    }

    /// Comma separated form expected by the registrar API.
    pub fn joined(&self) -> String {
        format!("{},{}", self.primary, self.secondary)
    }
}

/// A DNS record inside a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    /// Fully qualified record name.
    pub name: String,
    /// Record type (`A`, `CNAME`, ...).
    pub record_type: String,
    pub content: String,
    pub proxied: bool,
}

/// Request to create an `A` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateARecordRequest {
    /// Relative name (`@`, `www`).
    pub name: String,
    /// IPv4 address.
    pub address: String,
    pub proxied: bool,
}

/// Edge SSL mode of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslMode {
    /// Edge to origin over HTTPS (origin has a certificate).
    Full,
    /// Edge to origin over HTTP.
    Flexible,
}

impl SslMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Flexible => "flexible",
        }
    }
}

// ============ Registrar ============

/// Registrar API credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrarCredentials {
    /// API user (also used as `UserName`).
    pub username: String,
    pub api_key: String,
    /// Whitelisted client IP required by the registrar.
    pub client_ip: String,
}

impl std::fmt::Debug for RegistrarCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrarCredentials")
            .field("username", &self.username)
            .field("api_key", &mask_secret(&self.api_key))
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

// ============ Content generation ============

/// Connection settings for the content generation API.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl std::fmt::Debug for GeneratorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSettings")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-4o".to_string(),
            image_model: "dall-e-2".to_string(),
        }
    }
}

/// A generated article: title, HTML body and a URL of the generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub title: String,
    pub body: String,
    pub image_url: String,
}

// ============ Status API ============

/// Server status as sent over the wire.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerStatusUpdate {
    pub server_ip: String,
    pub status: String,
}

/// Site status as sent over the wire.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SiteStatusUpdate {
    pub domain: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_step: Option<String>,
    /// Flags the completed step invalidates (a theme change drops the contact form).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cleared_steps: Vec<String>,
}

/// Site admin credentials as sent over the wire.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct SiteCredentialsUpdate {
    pub domain: String,
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for SiteCredentialsUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCredentialsUpdate")
            .field("domain", &self.domain)
            .field("login", &self.login)
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_servers_need_two_entries() {
        let one = vec!["ada.ns.cloudflare.com".to_string()];
        assert!(NameServers::from_list(&one).is_none());

        let two = vec![
            "ada.ns.cloudflare.com".to_string(),
            "bob.ns.cloudflare.com".to_string(),
        ];
        let ns = NameServers::from_list(&two).unwrap();
        assert_eq!(ns.joined(), "ada.ns.cloudflare.com,bob.ns.cloudflare.com");
    }

    #[test]
    fn debug_hides_api_keys() {
        let creds = ZoneCredentials {
            email: "ops@example.com".to_string(),
            api_key: "0123456789abcdef".to_string(),
        };
        let out = format!("{creds:?}");
        assert!(!out.contains("0123456789abcdef"));
        assert!(out.contains("ops@example.com"));
    }

    #[test]
    fn site_status_skips_missing_step() {
        let update = SiteStatusUpdate {
            domain: "example.com".to_string(),
            status: "done".to_string(),
            complete_step: None,
            cleared_steps: Vec::new(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("complete_step").is_none());
        assert!(json.get("cleared_steps").is_none());
    }
}
