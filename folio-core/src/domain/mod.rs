mod about;
mod blog;
mod message;
mod project;
mod site;

pub use about::*;
pub use blog::*;
pub use message::*;
pub use project::*;
pub use site::*;

use serde::{Deserialize, Serialize};

/// Publication state shared by projects and blog posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

impl PublishStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DRAFT" => Some(PublishStatus::Draft),
            "PUBLISHED" => Some(PublishStatus::Published),
            _ => None,
        }
    }

    pub fn is_published(self) -> bool {
        self == PublishStatus::Published
    }
}
