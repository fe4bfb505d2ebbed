use super::{EntityInput, FieldErrors, Mode};
use crate::common::dates;
use crate::common::error::Result;
use crate::domain::{BlogPost, PublishStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "dates::nullable_flexible::deserialize")]
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl EntityInput for BlogPostInput {
    type Entity = BlogPost;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "title", &self.title, 1, Some(200));
        errors.slug(mode, "slug", &self.slug);
        errors.text(mode, "content", &self.content, 1, None);
        errors.text(mode, "excerpt", &self.excerpt, 1, Some(500));
        errors.optional_url("featuredImage", &self.featured_image);
        if let Some(tags) = &self.tags {
            errors.each_max("tags", tags, 50);
        }
        errors.into_result()
    }

    /// New post from a create-mode payload. `publishedAt` defaults to now for
    /// posts created as published.
    fn build(self, now: DateTime<Utc>) -> BlogPost {
        let content = self.content.unwrap_or_default();
        let status = self.status.unwrap_or_default();
        let published_at = match self.published_at.flatten() {
            Some(at) => Some(at),
            None if status.is_published() => Some(now),
            None => None,
        };
        BlogPost {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
            read_time: read_time(&content),
            content,
            excerpt: self.excerpt.unwrap_or_default(),
            featured_image: self.featured_image,
            tags: self.tags.unwrap_or_default(),
            status,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Patch a post. The first transition to published stamps `publishedAt`;
    /// unpublishing keeps whatever was there.
    fn apply(self, post: &mut BlogPost, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            post.title = v;
        }
        if let Some(v) = self.slug {
            post.slug = v;
        }
        if let Some(v) = self.content {
            post.read_time = read_time(&v);
            post.content = v;
        }
        if let Some(v) = self.excerpt {
            post.excerpt = v;
        }
        if self.featured_image.is_some() {
            post.featured_image = self.featured_image;
        }
        if let Some(v) = self.tags {
            post.tags = v;
        }
        if let Some(status) = self.status {
            if status.is_published() && post.published_at.is_none() {
                post.published_at = Some(now);
            }
            post.status = status;
        }
        post.updated_at = now;
    }
}

/// Minutes to read at 200 words per minute, never less than one.
pub fn read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_read_time() {
        assert_eq!(read_time(""), 1);
        assert_eq!(read_time("one two three"), 1);
        assert_eq!(read_time(&"word ".repeat(200)), 1);
        assert_eq!(read_time(&"word ".repeat(201)), 2);
        assert_eq!(read_time(&"word\n\t".repeat(1000)), 5);
    }

    #[test]
    fn test_published_at_rules() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let draft: BlogPostInput = serde_json::from_value(json!({
            "title": "T", "slug": "t", "content": "c", "excerpt": "e"
        }))
        .unwrap();
        let mut post = draft.build(now);
        assert_eq!(post.published_at, None);

        let later = now + chrono::Duration::days(1);
        BlogPostInput {
            status: Some(PublishStatus::Published),
            ..Default::default()
        }
        .apply(&mut post, later);
        assert_eq!(post.published_at, Some(later));

        BlogPostInput {
            status: Some(PublishStatus::Draft),
            ..Default::default()
        }
        .apply(&mut post, later + chrono::Duration::days(1));
        assert_eq!(post.status, PublishStatus::Draft);
        assert_eq!(post.published_at, Some(later));
    }

    #[test]
    fn test_explicit_published_at_is_kept_on_create() {
        let payload: BlogPostInput = serde_json::from_value(json!({
            "title": "T", "slug": "t", "content": "c", "excerpt": "e",
            "status": "PUBLISHED", "publishedAt": "2020-02-02"
        }))
        .unwrap();
        let post = payload.build(Utc::now());
        assert_eq!(post.published_at, dates::parse_flexible("2020-02-02"));
    }
}
