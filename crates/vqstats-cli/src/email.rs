//! Emails the summary CSV over SMTP with STARTTLS.

use std::path::Path;

use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use vqstats_core::SmtpConfig;

fn mailbox(address: &str, role: &str) -> anyhow::Result<Mailbox> {
    address
        .parse()
        .with_context(|| format!("invalid {role} address '{address}'"))
}

/// Plain-text body plus the CSV as an attachment.
pub(crate) fn build_message(
    smtp: &SmtpConfig,
    attachment_name: &str,
    csv: Vec<u8>,
) -> anyhow::Result<Message> {
    let csv_type = ContentType::parse("text/csv")
        .map_err(|e| anyhow::anyhow!("invalid attachment content type: {e}"))?;
    let attachment = Attachment::new(attachment_name.to_owned()).body(csv, csv_type);

    Message::builder()
        .from(mailbox(&smtp.user, "sender")?)
        .to(mailbox(&smtp.to, "recipient")?)
        .subject(smtp.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(smtp.body.clone()))
                .singlepart(attachment),
        )
        .context("failed to build email message")
}

/// Sends `csv_path` to the configured recipient.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the addresses are invalid,
/// or the SMTP exchange fails.
pub(crate) async fn send_summary(smtp: &SmtpConfig, csv_path: &Path) -> anyhow::Result<()> {
    let csv = tokio::fs::read(csv_path)
        .await
        .with_context(|| format!("cannot read {}", csv_path.display()))?;
    let name = csv_path
        .file_name()
        .map_or_else(|| "summary.csv".to_owned(), |n| n.to_string_lossy().into_owned());
    let message = build_message(smtp, &name, csv)?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        .with_context(|| format!("invalid SMTP host '{}'", smtp.host))?
        .port(smtp.port)
        .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
        .build();

    transport
        .send(message)
        .await
        .with_context(|| format!("failed to send email via {}:{}", smtp.host, smtp.port))?;
    tracing::info!(to = %smtp.to, attachment = %name, "summary emailed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: "reports@example.com".to_string(),
            password: "secret".to_string(),
            to: "qa-leads@example.com".to_string(),
            subject: "Test Execution Results".to_string(),
            body: "Please find attached the test execution results.".to_string(),
        }
    }

    #[test]
    fn message_carries_subject_and_attachment() {
        let message = build_message(&smtp(), "summary.csv", b"Team Name\nAlpha\n".to_vec())
            .expect("message should build");
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();

        assert!(raw.contains("Subject: Test Execution Results"), "{raw}");
        assert!(raw.contains("qa-leads@example.com"), "{raw}");
        assert!(raw.contains("summary.csv"), "{raw}");
        assert!(raw.contains("text/csv"), "{raw}");
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let mut config = smtp();
        config.to = "not an address".to_string();
        let err = build_message(&config, "summary.csv", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("recipient"), "got: {err}");
    }
}
