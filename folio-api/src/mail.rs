use crate::config::{MailBackend, MailConfig};
use async_trait::async_trait;
use folio_core::ContactMessage;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivers the owner's notification for a new contact message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact_notification(&self, message: &ContactMessage) -> Result<(), MailError>;
}

pub fn notification_subject(message: &ContactMessage) -> String {
    if message.subject.is_empty() {
        format!("New contact form message from {}", message.name)
    } else {
        format!("New contact form message: {}", message.subject)
    }
}

pub fn notification_body(message: &ContactMessage) -> String {
    let subject = if message.subject.is_empty() {
        "(none)"
    } else {
        message.subject.as_str()
    };
    format!(
        "You received a new message through your portfolio contact form.\n\n\
         Name: {}\nEmail: {}\nSubject: {}\nMessage ID: {}\n\n{}\n",
        message.name, message.email, subject, message.id, message.message
    )
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::Address(address.to_string()))
}

/// Sends through an SMTP relay (SES SMTP endpoint in production).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: mailbox(&config.from)?,
            to: mailbox(&config.contact_email)?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact_notification(&self, message: &ContactMessage) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification_subject(message))
            .header(ContentType::TEXT_PLAIN);
        // Replies go straight to the visitor.
        if let Ok(reply_to) = mailbox(&message.email) {
            builder = builder.reply_to(reply_to);
        }
        let email = builder.body(notification_body(message))?;
        self.transport.send(email).await?;
        info!("Sent contact notification for message {}", message.id);
        Ok(())
    }
}

/// Writes notifications to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_contact_notification(&self, message: &ContactMessage) -> Result<(), MailError> {
        info!(
            message_id = %message.id,
            from = %message.email,
            "Contact notification (not sent): {}",
            notification_subject(message)
        );
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.backend {
        MailBackend::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
        MailBackend::Log => Ok(Arc::new(LogMailer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn message(subject: &str) -> ContactMessage {
        ContactMessage {
            id: Uuid::nil(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: subject.into(),
            message: "Would love to chat about a project.".into(),
            read: false,
            archived: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_notification_text() {
        assert_eq!(
            notification_subject(&message("")),
            "New contact form message from Ada"
        );
        assert_eq!(
            notification_subject(&message("Hiring")),
            "New contact form message: Hiring"
        );
        let body = notification_body(&message(""));
        assert!(body.contains("Email: ada@example.com"));
        assert!(body.contains("Subject: (none)"));
        assert!(body.contains("Would love to chat"));
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_recipient() {
        let config = MailConfig {
            backend: MailBackend::Smtp,
            smtp_host: "localhost".into(),
            contact_email: "not an address".into(),
            ..MailConfig::default()
        };
        assert!(matches!(SmtpMailer::new(&config), Err(MailError::Address(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        LogMailer
            .send_contact_notification(&message("Hi"))
            .await
            .unwrap();
    }
}
