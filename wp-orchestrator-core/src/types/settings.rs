//! 工作流运行参数

use std::time::Duration;

/// Plugins installed by the "manage plugins" workflow when none are configured.
pub const DEFAULT_PLUGINS: &[&str] = &[
    "wp-smushit",
    "wordpress-seo",
    "cookie-notice",
    "contact-form-7",
    "jetpack",
    "wp-simple-firewall",
];

/// Widest allowed gap between two generated posts, in days.
pub const MAX_POST_STEP_DAYS: u32 = 5;

/// Host layout and limits shared by every workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// WP-CLI binary on the managed hosts
    pub wp_cli: String,
    /// Parent directory of every site's document root
    pub web_root: String,
    /// Apache `conf.d` directory
    pub vhost_dir: String,
    pub plugins: Vec<String>,
    /// Upper bound for a single remote command
    pub command_timeout: Duration,
    /// Largest backward step between two generated posts, in days
    /// (1..=[`MAX_POST_STEP_DAYS`])
    pub post_date_max_step_days: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            wp_cli: "/usr/local/bin/wp".to_string(),
            web_root: "/var/www".to_string(),
            vhost_dir: "/etc/httpd/conf.d".to_string(),
            plugins: DEFAULT_PLUGINS.iter().map(ToString::to_string).collect(),
            command_timeout: Duration::from_secs(900),
            post_date_max_step_days: MAX_POST_STEP_DAYS,
        }
    }
}

impl WorkflowSettings {
    /// Document root of a site.
    pub fn site_root(&self, domain: &str) -> String {
        format!("{}/{domain}", self.web_root)
    }

    /// Port-80 virtual host file of a site.
    pub fn http_vhost_path(&self, domain: &str) -> String {
        format!("{}/{domain}.conf", self.vhost_dir)
    }

    /// Port-443 virtual host file of a site.
    pub fn ssl_vhost_path(&self, domain: &str) -> String {
        format!("{}/{domain}-ssl.conf", self.vhost_dir)
    }
}
