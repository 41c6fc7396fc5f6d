//! 报表邮件发送 Trait

use async_trait::async_trait;

use crate::error::CoreResult;

/// A mail with one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment_type: String,
    pub attachment: Vec<u8>,
}

/// 报表邮件发送
///
/// 平台实现: `SmtpReportMailer` (lettre, STARTTLS)
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send(&self, mail: ReportMail) -> CoreResult<()>;
}
