//! Request validation.
//!
//! Every input type has all-optional fields so the same struct serves both
//! create (required fields enforced) and partial update payloads. Failures are
//! collected per field rather than stopping at the first one.

mod about;
mod blog;
mod contact;
mod message;
mod project;
mod shared;
mod site;

pub use about::*;
pub use blog::*;
pub use contact::*;
pub use message::*;
pub use project::*;
pub use shared::*;
pub use site::*;

use crate::common::error::{FolioError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$").unwrap()
});

/// Whether required fields must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// A create/patch payload for one stored entity type.
pub trait EntityInput: DeserializeOwned + Send {
    type Entity;

    fn validate(&self, mode: Mode) -> Result<()>;

    /// Build a new entity. Only meaningful after `validate(Mode::Create)`.
    fn build(self, now: DateTime<Utc>) -> Self::Entity;

    /// Overwrite the fields present in the payload.
    fn apply(self, entity: &mut Self::Entity, now: DateTime<Utc>);
}

/// Flattened validation failures: form-level messages plus messages per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single form-level failure, e.g. a body that is not valid JSON.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FolioError::Validation(self))
        }
    }

    /// Require presence in create mode; returns the value when there is one to check.
    pub fn present<'a, T>(&mut self, mode: Mode, field: &str, value: &'a Option<T>) -> Option<&'a T> {
        if value.is_none() && mode == Mode::Create {
            self.add(field, "Required");
        }
        value.as_ref()
    }

    /// Character-length bounds on a string.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) {
        let len = value.chars().count();
        if len < min {
            if min == 1 {
                self.add(field, "Must not be empty");
            } else {
                self.add(field, format!("Must be at least {min} characters"));
            }
        }
        if let Some(max) = max {
            if len > max {
                self.add(field, format!("Must be at most {max} characters"));
            }
        }
    }

    /// Required (in create mode) bounded string.
    pub fn text(&mut self, mode: Mode, field: &str, value: &Option<String>, min: usize, max: Option<usize>) {
        if let Some(value) = self.present(mode, field, value) {
            self.length(field, value, min, max);
        }
    }

    /// Optional bounded string.
    pub fn optional_text(&mut self, field: &str, value: &Option<String>, max: usize) {
        if let Some(value) = value {
            self.length(field, value, 0, Some(max));
        }
    }

    pub fn slug(&mut self, mode: Mode, field: &str, value: &Option<String>) {
        if let Some(value) = self.present(mode, field, value) {
            if !SLUG.is_match(value) {
                self.add(field, "Invalid slug format");
            }
            self.length(field, value, 0, Some(200));
        }
    }

    /// An absolute URL.
    pub fn url(&mut self, field: &str, value: &str) {
        if !is_url(value) {
            self.add(field, "Invalid URL");
        }
    }

    /// Absent, empty, or an absolute URL.
    pub fn optional_url(&mut self, field: &str, value: &Option<String>) {
        if let Some(value) = value {
            if !value.is_empty() {
                self.url(field, value);
            }
        }
    }

    pub fn email(&mut self, mode: Mode, field: &str, value: &Option<String>) {
        if let Some(value) = self.present(mode, field, value) {
            if !is_email(value) {
                self.add(field, "Invalid email address");
            }
            self.length(field, value, 0, Some(254));
        }
    }

    /// Every entry of a string list is at most `max` characters.
    pub fn each_max(&mut self, field: &str, values: &[String], max: usize) {
        for (i, value) in values.iter().enumerate() {
            if value.chars().count() > max {
                self.add(&format!("{field}.{i}"), format!("Must be at most {max} characters"));
            }
        }
    }
}

pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_slug(value: &str) -> bool {
    SLUG.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_pattern() {
        assert!(is_slug("ecommerce-platform"));
        assert!(is_slug("a1"));
        assert!(!is_slug("Has-Caps"));
        assert!(!is_slug("double--hyphen"));
        assert!(!is_slug("-leading"));
        assert!(!is_slug(""));
    }

    #[test]
    fn test_email_and_url() {
        assert!(is_email("hello@example.com"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("missing@tld"));
        assert!(is_url("https://example.com/a?b=c"));
        assert!(!is_url("example.com"));
    }

    #[test]
    fn test_create_mode_reports_missing_fields() {
        let mut errors = FieldErrors::new();
        errors.text(Mode::Create, "title", &None, 1, Some(200));
        errors.text(Mode::Update, "excerpt", &None, 1, Some(500));
        assert_eq!(errors.field_errors.get("title"), Some(&vec!["Required".to_string()]));
        assert!(!errors.field_errors.contains_key("excerpt"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        errors.length("name", "ééé", 1, Some(3));
        assert!(errors.is_empty());
        errors.length("name", "éééé", 1, Some(3));
        assert_eq!(errors.field_errors["name"], vec!["Must be at most 3 characters"]);
    }
}
