use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SETTINGS_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: Uuid,
    pub headline: String,
    pub subheadline: Option<String>,
    pub bio: String,
    pub profile_image: String,
    pub resume_url: Option<String>,
    pub cta_buttons: Option<Vec<CtaButton>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaButton {
    pub label: String,
    pub url: String,
    pub variant: CtaVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaVariant {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: String,
    pub site_name: String,
    pub site_description: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub email: String,
    pub google_analytics_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSettings {
    /// Settings served before an administrator has saved any.
    pub fn fallback() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            site_name: "Portfolio".to_string(),
            site_description: Some(String::new()),
            social_links: None,
            email: String::new(),
            google_analytics_id: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl SocialLinks {
    /// Drop empty links; `None` when nothing is left.
    pub fn without_empty(self) -> Option<Self> {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        let links = Self {
            github: keep(self.github),
            linkedin: keep(self.linkedin),
            twitter: keep(self.twitter),
            youtube: keep(self.youtube),
            website: keep(self.website),
        };
        if links == Self::default() {
            None
        } else {
            Some(links)
        }
    }
}
