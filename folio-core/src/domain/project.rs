use super::PublishStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    /// Markdown.
    pub description: String,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub role: Option<String>,
    pub tech_tags: Vec<String>,
    pub images: Vec<ProjectImage>,
    /// Empty string when no thumbnail has been uploaded.
    pub thumbnail_image: String,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    pub featured: bool,
    pub display_order: i64,
    pub status: PublishStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub url: String,
    pub alt: String,
    pub order: i64,
}
