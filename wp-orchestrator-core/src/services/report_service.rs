//! 域名报表服务 (CSV + 邮件)

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::ReportMail;
use crate::types::DomainReportRow;

const HEADERS: [&str; 5] = ["Domain", "Server IP", "Added Date", "WP Login", "WP Password"];
const ATTACHMENT_NAME: &str = "domains.csv";

/// Render the domain report as CSV.
pub fn build_report_csv(rows: &[DomainReportRow]) -> CoreResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS).map_err(csv_error)?;
    for row in rows {
        let added_at = row.added_at.format("%Y-%m-%d %H:%M:%S").to_string();
        writer
            .write_record([
                row.domain.as_str(),
                row.server_ip.as_str(),
                added_at.as_str(),
                row.wp_login.as_deref().unwrap_or_default(),
                row.wp_password.as_deref().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::SerializationError(e.to_string()))
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::SerializationError(e.to_string())
}

pub struct ReportService {
    ctx: Arc<ServiceContext>,
}

impl ReportService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Mail the domain report to `recipient` as `domains.csv`.
    pub async fn send_domain_report(
        &self,
        recipient: &str,
        rows: &[DomainReportRow],
    ) -> CoreResult<()> {
        let attachment = build_report_csv(rows)?;
        self.ctx
            .mailer
            .send(ReportMail {
                recipient: recipient.to_string(),
                subject: "Domain report".to_string(),
                body: format!(
                    "Hello! Your report with {} domains is ready, see the attached file.",
                    rows.len()
                ),
                attachment_name: ATTACHMENT_NAME.to_string(),
                attachment_type: "text/csv".to_string(),
                attachment,
            })
            .await?;
        log::info!("Domain report ({} rows) sent to {recipient}", rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestHarness;
    use chrono::{TimeZone, Utc};

    fn rows() -> Vec<DomainReportRow> {
        vec![
            DomainReportRow {
                domain: "a.com".to_string(),
                server_ip: "10.0.0.5".to_string(),
                added_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
                wp_login: Some("quietfox42".to_string()),
                wp_password: Some("p,w\"1".to_string()),
            },
            DomainReportRow {
                domain: "b.com".to_string(),
                server_ip: "10.0.0.9".to_string(),
                added_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
                wp_login: None,
                wp_password: None,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_quoted_fields() {
        let csv = String::from_utf8(build_report_csv(&rows()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Domain,Server IP,Added Date,WP Login,WP Password");
        assert_eq!(
            lines[1],
            "a.com,10.0.0.5,2024-03-01 09:30:00,quietfox42,\"p,w\"\"1\""
        );
        assert_eq!(lines[2], "b.com,10.0.0.9,2024-03-02 00:00:00,,");
    }

    #[test]
    fn empty_report_is_only_the_header() {
        let csv = build_report_csv(&[]).unwrap();
        assert_eq!(csv, b"Domain,Server IP,Added Date,WP Login,WP Password\n");
    }

    #[tokio::test]
    async fn mails_csv_attachment() {
        let h = TestHarness::new();
        ReportService::new(h.ctx.clone())
            .send_domain_report("boss@example.com", &rows())
            .await
            .unwrap();

        let sent = h.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "boss@example.com");
        assert_eq!(sent[0].attachment_name, "domains.csv");
        assert_eq!(sent[0].attachment_type, "text/csv");
        assert_eq!(sent[0].attachment, build_report_csv(&rows()).unwrap());
    }
}
