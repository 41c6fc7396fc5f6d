//! Remote command building and the session wrapper used by the workflows

pub mod commands;
pub mod naming;
pub mod templates;
pub mod wp_config;
mod shell;

pub use commands::{shell_quote, DbCredentials, WpCli};
pub use shell::Shell;
