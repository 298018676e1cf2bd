//! Reviewer invitation mail client
//!
//! Sends peer-review invitations over SMTP. When no SMTP credentials are
//! configured the client runs in development mode and logs the invitation
//! instead of sending it.

use crate::config::SmtpConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// A reviewer invitation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerInvitation {
    #[validate(email)]
    pub reviewer_email: String,

    #[validate(length(min = 1))]
    pub reviewer_name: String,

    #[validate(length(min = 1))]
    pub paper_title: String,

    #[validate(length(min = 1))]
    pub paper_doi: String,

    #[validate(length(min = 1))]
    pub journal_name: String,

    #[validate(url)]
    pub invitation_link: String,
}

/// Result of an invitation send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReport {
    pub success: bool,
    pub mode: &'static str,
    pub email: String,
}

/// Result of a bulk send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendReport {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
}

/// SMTP mail client
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl Mailer {
    /// Build a mailer from configuration. Missing credentials select
    /// development mode.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| AppError::Configuration {
                        message: format!("Invalid SMTP relay: {}", e),
                    })?
                    .port(config.port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build();
                Some(transport)
            }
            _ => None,
        };

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    /// Whether real SMTP delivery is configured
    pub fn is_live(&self) -> bool {
        self.transport.is_some()
    }

    /// Send a single reviewer invitation
    pub async fn send_invitation(&self, invitation: &ReviewerInvitation) -> Result<SendReport> {
        let subject = format!("Invitation to Review: {}", invitation.paper_title);

        let Some(transport) = &self.transport else {
            info!(
                email = %invitation.reviewer_email,
                subject = %subject,
                link = %invitation.invitation_link,
                "Development mode: invitation logged, not sent"
            );
            metrics::record_invitation(false);
            return Ok(SendReport {
                success: true,
                mode: "development",
                email: invitation.reviewer_email.clone(),
            });
        };

        let message = Message::builder()
            .from(self.from.parse().map_err(|e| AppError::Configuration {
                message: format!("Invalid from address: {}", e),
            })?)
            .to(invitation
                .reviewer_email
                .parse()
                .map_err(|e| AppError::Validation {
                    message: format!("Invalid reviewer email: {}", e),
                    field: Some("reviewerEmail".to_string()),
                })?)
            .subject(&subject)
            .header(ContentType::TEXT_HTML)
            .body(invitation_body(invitation))
            .map_err(|e| AppError::MailError {
                message: format!("Failed to build message: {}", e),
            })?;

        transport.send(message).await.map_err(|e| AppError::MailError {
            message: format!("Failed to send email: {}", e),
        })?;

        info!(email = %invitation.reviewer_email, "Invitation email sent");
        metrics::record_invitation(true);

        Ok(SendReport {
            success: true,
            mode: "smtp",
            email: invitation.reviewer_email.clone(),
        })
    }

    /// Send a batch of invitations; individual failures don't abort the batch
    pub async fn send_bulk(&self, invitations: &[ReviewerInvitation]) -> BulkSendReport {
        let results =
            futures::future::join_all(invitations.iter().map(|inv| self.send_invitation(inv)))
                .await;

        let successful = results.iter().filter(|r| r.is_ok()).count();

        BulkSendReport {
            successful,
            failed: results.len() - successful,
            total: results.len(),
        }
    }
}

/// HTML body for the invitation email
fn invitation_body(invitation: &ReviewerInvitation) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #333;">Peer Review Invitation</h2>
    <p>Dear {reviewer_name},</p>

    <p>You have been invited to review the following manuscript:</p>

    <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
        <h3 style="margin-top: 0;">{paper_title}</h3>
        <p><strong>Journal:</strong> {journal_name}</p>
        <p><strong>DOI:</strong> {paper_doi}</p>
    </div>

    <p>We believe your expertise makes you an ideal reviewer for this work.</p>

    <p style="margin: 30px 0;">
        <a href="{invitation_link}"
           style="background-color: #667eea; color: white; padding: 12px 30px;
                  text-decoration: none; border-radius: 5px; display: inline-block;">
            Accept Invitation
        </a>
    </p>

    <p>If you have any questions, please don't hesitate to contact us.</p>

    <p>Best regards,<br>
    Editorial Team</p>

    <hr style="margin-top: 30px; border: none; border-top: 1px solid #ddd;">
    <p style="font-size: 12px; color: #666;">
        This is an automated message from the STM Indexing &amp; Verification Platform.
    </p>
</div>"#,
        reviewer_name = invitation.reviewer_name,
        paper_title = invitation.paper_title,
        journal_name = invitation.journal_name,
        paper_doi = invitation.paper_doi,
        invitation_link = invitation.invitation_link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> ReviewerInvitation {
        ReviewerInvitation {
            reviewer_email: "reviewer@test.com".to_string(),
            reviewer_name: "Jane Smith".to_string(),
            paper_title: "Machine Learning in Academic Indexing".to_string(),
            paper_doi: "10.1234/ijsr.2023.001".to_string(),
            journal_name: "International Journal of STM Research".to_string(),
            invitation_link: "https://stm.example.com/review/abc".to_string(),
        }
    }

    #[test]
    fn test_invitation_validation() {
        assert!(invitation().validate().is_ok());

        let mut bad = invitation();
        bad.reviewer_email = "not-an-email".to_string();
        assert!(bad.validate().is_err());

        let mut bad = invitation();
        bad.invitation_link = "not a url".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_body_contains_paper_details() {
        let body = invitation_body(&invitation());
        assert!(body.contains("Machine Learning in Academic Indexing"));
        assert!(body.contains("10.1234/ijsr.2023.001"));
        assert!(body.contains("Jane Smith"));
        assert!(body.contains("https://stm.example.com/review/abc"));
    }

    #[test]
    fn test_dev_mode_send_does_not_fail() {
        let mailer = Mailer::new(&crate::config::SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from: "noreply@stm-indexing.com".to_string(),
        })
        .unwrap();

        assert!(!mailer.is_live());

        let report = tokio_test::block_on(mailer.send_invitation(&invitation())).unwrap();
        assert!(report.success);
        assert_eq!(report.mode, "development");
    }
}
