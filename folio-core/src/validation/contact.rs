use super::{FieldErrors, Mode};
use crate::common::error::Result;
use crate::domain::ContactMessage;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Public contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// Hidden form field; humans leave it empty.
    pub honeypot: Option<String>,
}

impl ContactInput {
    pub fn is_spam(&self) -> bool {
        self.honeypot.as_deref().is_some_and(|h| !h.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(Mode::Create, "name", &self.name, 1, Some(200));
        errors.email(Mode::Create, "email", &self.email);
        errors.optional_text("subject", &self.subject, 300);
        if let Some(message) = errors.present(Mode::Create, "message", &self.message) {
            if message.chars().count() < 10 {
                errors.add("message", "Message must be at least 10 characters");
            }
            errors.length("message", message, 0, Some(5000));
        }
        if self.is_spam() {
            errors.add("honeypot", "Must be empty");
        }
        errors.into_result()
    }

    pub fn build(self, now: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            read: false,
            archived: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FolioError;
    use serde_json::json;

    #[test]
    fn test_contact_rules() {
        let input: ContactInput = serde_json::from_value(json!({
            "name": "Ada", "email": "ada@example.com", "message": "short"
        }))
        .unwrap();
        match input.validate() {
            Err(FolioError::Validation(errors)) => {
                assert_eq!(
                    errors.field_errors["message"],
                    vec!["Message must be at least 10 characters"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_subject_defaults_to_empty() {
        let input: ContactInput = serde_json::from_value(json!({
            "name": "Ada", "email": "ada@example.com", "message": "Long enough message"
        }))
        .unwrap();
        assert!(!input.is_spam());
        input.validate().unwrap();
        let message = input.build(Utc::now());
        assert_eq!(message.subject, "");
        assert!(!message.read && !message.archived);
    }

    #[test]
    fn test_honeypot() {
        let input: ContactInput = serde_json::from_value(json!({ "honeypot": "gotcha" })).unwrap();
        assert!(input.is_spam());
        let blank: ContactInput = serde_json::from_value(json!({ "honeypot": "" })).unwrap();
        assert!(!blank.is_spam());
    }
}
