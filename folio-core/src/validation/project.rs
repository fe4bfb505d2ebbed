use super::{EntityInput, FieldErrors, Mode};
use crate::common::dates;
use crate::common::error::Result;
use crate::domain::{Project, ProjectImage, PublishStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Create or patch payload for a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub role: Option<String>,
    pub tech_tags: Option<Vec<String>>,
    pub images: Option<Vec<ProjectImage>>,
    pub thumbnail_image: Option<String>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    pub featured: Option<bool>,
    pub display_order: Option<i64>,
    pub status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    pub end_date: Option<DateTime<Utc>>,
}

impl EntityInput for ProjectInput {
    type Entity = Project;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "title", &self.title, 1, Some(200));
        errors.slug(mode, "slug", &self.slug);
        errors.text(mode, "shortDescription", &self.short_description, 1, Some(300));
        errors.text(mode, "description", &self.description, 1, None);
        errors.optional_text("problem", &self.problem, 5000);
        errors.optional_text("solution", &self.solution, 5000);
        errors.optional_text("role", &self.role, 200);

        if let Some(tags) = errors.present(mode, "techTags", &self.tech_tags) {
            if tags.is_empty() {
                errors.add("techTags", "At least one tag is required");
            }
            errors.each_max("techTags", tags, 50);
        }

        if let Some(images) = &self.images {
            for (i, image) in images.iter().enumerate() {
                errors.url(&format!("images.{i}.url"), &image.url);
                errors.length(&format!("images.{i}.alt"), &image.alt, 0, Some(200));
                if image.order < 0 {
                    errors.add(&format!("images.{i}.order"), "Must be zero or greater");
                }
            }
        }

        errors.optional_url("thumbnailImage", &self.thumbnail_image);
        errors.optional_url("liveUrl", &self.live_url);
        errors.optional_url("repoUrl", &self.repo_url);
        errors.into_result()
    }

    /// Build a new project from a payload already validated in create mode.
    fn build(self, now: DateTime<Utc>) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
            short_description: self.short_description.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            problem: self.problem,
            solution: self.solution,
            role: self.role,
            tech_tags: self.tech_tags.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            thumbnail_image: self.thumbnail_image.unwrap_or_default(),
            live_url: self.live_url,
            repo_url: self.repo_url,
            featured: self.featured.unwrap_or(false),
            display_order: self.display_order.unwrap_or(0),
            status: self.status.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite only the fields present in the payload.
    fn apply(self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            project.title = v;
        }
        if let Some(v) = self.slug {
            project.slug = v;
        }
        if let Some(v) = self.short_description {
            project.short_description = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if self.problem.is_some() {
            project.problem = self.problem;
        }
        if self.solution.is_some() {
            project.solution = self.solution;
        }
        if self.role.is_some() {
            project.role = self.role;
        }
        if let Some(v) = self.tech_tags {
            project.tech_tags = v;
        }
        if let Some(v) = self.images {
            project.images = v;
        }
        if let Some(v) = self.thumbnail_image {
            project.thumbnail_image = v;
        }
        if self.live_url.is_some() {
            project.live_url = self.live_url;
        }
        if self.repo_url.is_some() {
            project.repo_url = self.repo_url;
        }
        if let Some(v) = self.featured {
            project.featured = v;
        }
        if let Some(v) = self.display_order {
            project.display_order = v;
        }
        if let Some(v) = self.status {
            project.status = v;
        }
        if self.start_date.is_some() {
            project.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            project.end_date = self.end_date;
        }
        project.updated_at = now;
    }
}
