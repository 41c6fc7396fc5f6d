//! SMTP report mailer (lettre, STARTTLS).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::traits::{ReportMail, ReportMailer};
use wp_orchestrator_provider::mask_secret;

/// SMTP relay account.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address, e.g. `Reports <no-reply@example.com>`
    pub from: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &mask_secret(&self.password))
            .field("from", &self.from)
            .finish()
    }
}

pub struct SmtpReportMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpReportMailer {
    /// Prepare the transport. Nothing is sent until the first mail.
    pub fn new(settings: SmtpSettings) -> CoreResult<Self> {
        let from = parse_mailbox(&settings.from)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| CoreError::Mail(format!("Invalid SMTP relay {}: {e}", settings.host)))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();
        Ok(Self { transport, from })
    }
}

fn parse_mailbox(address: &str) -> CoreResult<Mailbox> {
    address
        .parse()
        .map_err(|e| CoreError::Mail(format!("Invalid address {address}: {e}")))
}

/// Plain-text body plus one attachment.
fn build_message(from: &Mailbox, mail: &ReportMail) -> CoreResult<Message> {
    let content_type = ContentType::parse(&mail.attachment_type).map_err(|e| {
        CoreError::Mail(format!("Invalid content type {}: {e}", mail.attachment_type))
    })?;

    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&mail.recipient)?)
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(
                    Attachment::new(mail.attachment_name.clone())
                        .body(mail.attachment.clone(), content_type),
                ),
        )
        .map_err(|e| CoreError::Mail(format!("Failed to build mail: {e}")))
}

#[async_trait]
impl ReportMailer for SmtpReportMailer {
    async fn send(&self, mail: ReportMail) -> CoreResult<()> {
        let message = build_message(&self.from, &mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| CoreError::Mail(format!("Failed to send to {}: {e}", mail.recipient)))?;
        log::debug!("SMTP relay answered {}", response.code());
        Ok(())
    }
}
