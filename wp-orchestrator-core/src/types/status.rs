//! 服务器与站点状态

use serde::{Deserialize, Serialize};

/// Server lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Idle and usable
    Added,
    /// A workflow is running against the server
    #[serde(rename = "configure")]
    Configuring,
    /// The last workflow failed
    Error,
}

impl ServerStatus {
    /// Value sent to the status API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Configuring => "configure",
            Self::Error => "error",
        }
    }
}

/// Site lifecycle status.
///
/// ```text
/// added ──► configuring ──► done
///              ▲   │  ▲       │
///              │   ▼  └───────┘
///              └─ error
/// ```
///
/// Every move into `done` or `error` passes through `configuring`.
/// `configuring -> added` is the teardown exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Added,
    #[serde(rename = "configure")]
    Configuring,
    Done,
    Error,
}

impl SiteStatus {
    /// Value sent to the status API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Configuring => "configure",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Added | Self::Done | Self::Error, Self::Configuring) => true,
            (Self::Configuring, Self::Done | Self::Error | Self::Added) => true,
            _ => false,
        }
    }
}

/// Capability flag set by the workflow responsible for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletedStep {
    PluginsInstalled,
    ThemeChanged,
    PostsCreated,
    FormAdded,
}

impl CompletedStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PluginsInstalled => "plugins_installed",
            Self::ThemeChanged => "theme_changed",
            Self::PostsCreated => "posts_created",
            Self::FormAdded => "form_added",
        }
    }

    /// Flags that stop being true once this step completes.
    ///
    /// A new theme drops the filter the contact form was injected through.
    pub fn invalidates(self) -> &'static [CompletedStep] {
        match self {
            Self::ThemeChanged => &[Self::FormAdded],
            _ => &[],
        }
    }
}

/// The four progress flags of a site, as the system of record keeps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFlags {
    pub plugins_installed: bool,
    pub theme_changed: bool,
    pub posts_created: bool,
    pub form_added: bool,
}

impl SiteFlags {
    /// Apply one completed step, including the flags it invalidates.
    pub fn apply(&mut self, step: CompletedStep) {
        for cleared in step.invalidates() {
            self.set(*cleared, false);
        }
        self.set(step, true);
    }

    /// Flags are cleared together when the site returns to `added`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, step: CompletedStep) -> bool {
        match step {
            CompletedStep::PluginsInstalled => self.plugins_installed,
            CompletedStep::ThemeChanged => self.theme_changed,
            CompletedStep::PostsCreated => self.posts_created,
            CompletedStep::FormAdded => self.form_added,
        }
    }

    fn set(&mut self, step: CompletedStep, value: bool) {
        match step {
            CompletedStep::PluginsInstalled => self.plugins_installed = value,
            CompletedStep::ThemeChanged => self.theme_changed = value,
            CompletedStep::PostsCreated => self.posts_created = value,
            CompletedStep::FormAdded => self.form_added = value,
        }
    }
}
