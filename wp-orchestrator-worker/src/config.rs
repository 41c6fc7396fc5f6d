//! 配置加载：TOML 文件 + 环境变量覆盖

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use serde::Deserialize;
use wp_orchestrator_core::types::{DEFAULT_PLUGINS, MAX_POST_STEP_DAYS, WorkflowSettings};

/// Used when `WPO_CONFIG` is not set and the file exists.
const DEFAULT_CONFIG_FILE: &str = "wp-orchestrator.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub worker: WorkerSection,
    pub logging: LoggingSection,
    pub keys: KeysSection,
    pub status_api: StatusApiSection,
    pub generator: GeneratorSection,
    pub mail: MailSection,
    pub wordpress: WordpressSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WorkerSection {
    pub listen: String,
    /// Workflows running at the same time
    pub concurrency: usize,
    /// `None` keeps the journal in memory
    pub journal_path: Option<PathBuf>,
    pub command_timeout_secs: u64,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8700".to_string(),
            concurrency: num_cpus::get().max(2),
            journal_path: Some(PathBuf::from("/var/lib/wp-orchestrator/journal.json")),
            command_timeout_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
    /// Daily rolling files here instead of stdout
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeysSection {
    pub directory: PathBuf,
}

impl Default for KeysSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/var/lib/wp-orchestrator/keys"),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct StatusApiSection {
    pub base_url: String,
    pub token: Option<String>,
    pub max_attempts: u32,
}

impl Default for StatusApiSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            max_attempts: wp_orchestrator_core::outbox::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl std::fmt::Debug for StatusApiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusApiSection")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "****"))
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-4o".to_string(),
            image_model: "dall-e-2".to_string(),
        }
    }
}

impl std::fmt::Debug for GeneratorSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSection")
            .field("api_key", &"****")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
        }
    }
}

impl std::fmt::Debug for MailSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSection")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WordpressSection {
    pub wp_cli: String,
    pub web_root: String,
    pub vhost_dir: String,
    pub plugins: Vec<String>,
    pub post_date_max_step_days: u32,
}

impl Default for WordpressSection {
    fn default() -> Self {
        let defaults = WorkflowSettings::default();
        Self {
            wp_cli: defaults.wp_cli,
            web_root: defaults.web_root,
            vhost_dir: defaults.vhost_dir,
            plugins: DEFAULT_PLUGINS.iter().map(ToString::to_string).collect(),
            post_date_max_step_days: defaults.post_date_max_step_days,
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl WorkerConfig {
    /// Load configuration.
    ///
    /// Evaluation order:
    /// 1) `$WPO_CONFIG` (must exist),
    /// 2) `./wp-orchestrator.toml` if present,
    /// 3) defaults;
    ///
    /// then `WPO_*` environment overrides, then validation.
    pub fn load() -> anyhow::Result<(Self, ConfigSource)> {
        let (mut config, source) = match std::env::var("WPO_CONFIG") {
            Ok(path) if !path.trim().is_empty() => {
                let path = PathBuf::from(path);
                (Self::load_from_file(&path)?, ConfigSource::File(path))
            }
            _ if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                (Self::load_from_file(&path)?, ConfigSource::File(path))
            }
            _ => (Self::default(), ConfigSource::Defaults),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok((config, source))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        Self::parse(&contents, &path.display().to_string())
    }

    pub fn parse(contents: &str, origin: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).map_err(|err| anyhow!("invalid config {origin}: {err}"))
    }

    /// Apply `WPO_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(listen) = lookup("WPO_LISTEN") {
            self.worker.listen = listen;
        }
        if let Some(url) = lookup("WPO_STATUS_API_URL") {
            self.status_api.base_url = url;
        }
        if let Some(token) = lookup("WPO_STATUS_API_TOKEN") {
            self.status_api.token = Some(token);
        }
        if let Some(key) = lookup("WPO_GENERATOR_API_KEY") {
            self.generator.api_key = key;
        }
        if let Some(password) = lookup("WPO_SMTP_PASSWORD") {
            self.mail.password = password;
        }
    }

    /// Missing endpoints and secrets are a start-up error.
    pub fn validate(&self) -> anyhow::Result<()> {
        let missing: Vec<&str> = [
            ("status_api.base_url", self.status_api.base_url.as_str()),
            ("generator.api_key", self.generator.api_key.as_str()),
            ("mail.smtp_host", self.mail.smtp_host.as_str()),
            ("mail.password", self.mail.password.as_str()),
            ("mail.from", self.mail.from.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            bail!("missing required configuration: {}", missing.join(", "));
        }
        if self.worker.concurrency == 0 {
            bail!("worker.concurrency must be at least 1");
        }
        let step = self.wordpress.post_date_max_step_days;
        if !(1..=MAX_POST_STEP_DAYS).contains(&step) {
            bail!(
                "wordpress.post_date_max_step_days must be between 1 and {MAX_POST_STEP_DAYS}, got {step}"
            );
        }
        Ok(())
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            wp_cli: self.wordpress.wp_cli.clone(),
            web_root: self.wordpress.web_root.trim_end_matches('/').to_string(),
            vhost_dir: self.wordpress.vhost_dir.trim_end_matches('/').to_string(),
            plugins: self.wordpress.plugins.clone(),
            command_timeout: Duration::from_secs(self.worker.command_timeout_secs),
            post_date_max_step_days: self.wordpress.post_date_max_step_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL: &str = r#"
[worker]
listen = "0.0.0.0:9000"
concurrency = 8
journal_path = "/tmp/journal.json"
command_timeout_secs = 600

[keys]
directory = "/tmp/keys"

[status_api]
base_url = "https://api.example.com"
max_attempts = 5

[generator]
api_key = "sk-test"
text_model = "gpt-4o-mini"

[mail]
smtp_host = "mail.example.com"
username = "no-reply@example.com"
password = "smtp-secret"
from = "no-reply@example.com"

[wordpress]
web_root = "/srv/www/"
plugins = ["jetpack"]
"#;

    #[test]
    fn parses_full_file() {
        let config = WorkerConfig::parse(FULL, "test").unwrap();
        assert_eq!(config.worker.listen, "0.0.0.0:9000");
        assert_eq!(config.worker.concurrency, 8);
        assert_eq!(config.status_api.max_attempts, 5);
        assert_eq!(config.generator.text_model, "gpt-4o-mini");
        // 未给出的字段使用默认值
        assert_eq!(config.generator.image_model, "dall-e-2");
        assert_eq!(config.mail.smtp_port, 587);
        config.validate().unwrap();

        let settings = config.workflow_settings();
        assert_eq!(settings.web_root, "/srv/www");
        assert_eq!(settings.plugins, vec!["jetpack".to_string()]);
        assert_eq!(settings.command_timeout, Duration::from_secs(600));
        assert_eq!(settings.vhost_dir, "/etc/httpd/conf.d");
    }

    #[test]
    fn missing_secrets_fail_validation() {
        let err = WorkerConfig::parse("[worker]\nconcurrency = 2\n", "test")
            .unwrap()
            .validate()
            .unwrap_err()
            .to_string();
        assert!(err.contains("status_api.base_url"));
        assert!(err.contains("generator.api_key"));
        assert!(err.contains("mail.password"));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = WorkerConfig::parse(FULL, "test").unwrap();
        let env: HashMap<&str, &str> = [
            ("WPO_LISTEN", "127.0.0.1:1234"),
            ("WPO_GENERATOR_API_KEY", "sk-from-env"),
            ("WPO_SMTP_PASSWORD", ""),
        ]
        .into_iter()
        .collect();
        config.apply_env(|name| env.get(name).map(ToString::to_string));

        assert_eq!(config.worker.listen, "127.0.0.1:1234");
        assert_eq!(config.generator.api_key, "sk-from-env");
        // 空值不覆盖
        assert_eq!(config.mail.password, "smtp-secret");
    }

    #[test]
    fn post_step_outside_range_is_rejected() {
        for step in [0, 6] {
            let text = FULL.replace(
                "[wordpress]\n",
                &format!("[wordpress]\npost_date_max_step_days = {step}\n"),
            );
            let err = WorkerConfig::parse(&text, "test")
                .unwrap()
                .validate()
                .unwrap_err()
                .to_string();
            assert!(err.contains("post_date_max_step_days"), "{err}");
        }

        let text = FULL.replace("[wordpress]\n", "[wordpress]\npost_date_max_step_days = 5\n");
        WorkerConfig::parse(&text, "test").unwrap().validate().unwrap();
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(WorkerConfig::parse("[logging]\nformat = \"xml\"\n", "test").is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let config = WorkerConfig::parse(FULL, "test").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("smtp-secret"));
    }
}
