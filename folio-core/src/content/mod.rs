//! Content services: the rules behind every admin and public operation.
//!
//! Services are cheap to clone; each holds typed repositories over one shared
//! [`Storage`].

mod blog;
mod collection;
mod dashboard;
mod messages;
mod projects;
mod public;
mod seed;
mod site;

pub use blog::*;
pub use collection::*;
pub use dashboard::*;
pub use messages::*;
pub use projects::*;
pub use public::*;
pub use seed::*;
pub use site::*;

use crate::common::error::{FolioError, Result};
use crate::domain::*;
use crate::storage::{Document, Repository, Storage};
use crate::validation::{FieldErrors, ReorderInput};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// All services over one storage backend.
#[derive(Clone)]
pub struct Content {
    pub projects: ProjectService,
    pub blog: BlogService,
    pub skills: SkillService,
    pub experience: ExperienceService,
    pub education: EducationService,
    pub certifications: CertificationService,
    pub site: SiteService,
    pub messages: MessageService,
    pub public: PublicService,
    pub dashboard: DashboardService,
}

impl Content {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            projects: ProjectService::new(Arc::clone(&storage)),
            blog: BlogService::new(Arc::clone(&storage)),
            skills: SkillService::new(Arc::clone(&storage)),
            experience: ExperienceService::new(Arc::clone(&storage)),
            education: EducationService::new(Arc::clone(&storage)),
            certifications: CertificationService::new(Arc::clone(&storage)),
            site: SiteService::new(Arc::clone(&storage)),
            messages: MessageService::new(Arc::clone(&storage)),
            public: PublicService::new(Arc::clone(&storage)),
            dashboard: DashboardService::new(storage),
        }
    }
}

/// Normalise a path id to the stored key. Anything that is not a UUID cannot
/// name a stored entity, so it is reported as missing.
pub fn entity_key<T: Document>(raw: &str) -> Result<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| FolioError::not_found(T::ENTITY))
}

/// Entities with an admin-controlled position in their list.
pub trait Ordered: Document {
    fn display_order(&self) -> i64;
    fn set_display_order(&mut self, order: i64, now: DateTime<Utc>);
}

/// Ordered entities that can be hidden from the public site.
pub trait Listed: Ordered {
    fn visible(&self) -> bool;
}

macro_rules! ordered {
    ($($ty:ty),*) => {
        $(impl Ordered for $ty {
            fn display_order(&self) -> i64 {
                self.display_order
            }

            fn set_display_order(&mut self, order: i64, now: DateTime<Utc>) {
                self.display_order = order;
                self.updated_at = now;
            }
        })*
    };
}

macro_rules! listed {
    ($($ty:ty),*) => {
        $(impl Listed for $ty {
            fn visible(&self) -> bool {
                self.visible
            }
        })*
    };
}

ordered!(Project, Skill, Experience, Education, Certification);
listed!(Skill, Experience, Education, Certification);

/// Stable sort by display order.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.display_order());
}

/// Give each listed id its index as display order, all in one write.
/// An unknown id fails the whole request before anything is saved.
pub(crate) async fn reorder<T: Ordered>(repo: &Repository<T>, input: &ReorderInput) -> Result<usize> {
    input.validate()?;
    let now = Utc::now();
    let mut docs = Vec::with_capacity(input.ids().len());
    for (index, raw) in input.ids().iter().enumerate() {
        let mut doc = repo.get(&entity_key::<T>(raw)?).await?;
        doc.set_display_order(index as i64, now);
        docs.push(doc);
    }
    repo.save_all(&docs).await?;
    Ok(docs.len())
}

/// Delete by path id, reporting a missing entity.
pub(crate) async fn delete_by_id<T: Document>(repo: &Repository<T>, id: &str) -> Result<()> {
    if repo.delete(&entity_key::<T>(id)?).await? {
        Ok(())
    } else {
        Err(FolioError::not_found(T::ENTITY))
    }
}

/// `?status=` on list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(PublishStatus),
}

impl StatusFilter {
    /// Absent means published only.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("") => Ok(StatusFilter::Only(PublishStatus::Published)),
            Some("all") => Ok(StatusFilter::All),
            Some(other) => PublishStatus::parse(other)
                .map(StatusFilter::Only)
                .ok_or_else(|| {
                    let mut errors = FieldErrors::new();
                    errors.add("status", "Expected PUBLISHED, DRAFT or all");
                    FolioError::Validation(errors)
                }),
        }
    }

    /// Anything beyond published content is admin-only.
    pub fn requires_auth(self) -> bool {
        self != StatusFilter::Only(PublishStatus::Published)
    }

    pub fn matches(self, status: PublishStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

/// `?visible=` on about-page collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    All,
}

impl Visibility {
    /// Absent means visible only; any unrecognised value selects hidden entries.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("true") {
            "true" => Visibility::Visible,
            "all" => Visibility::All,
            _ => Visibility::Hidden,
        }
    }

    pub fn requires_auth(self) -> bool {
        self == Visibility::All
    }

    pub fn matches(self, visible: bool) -> bool {
        match self {
            Visibility::Visible => visible,
            Visibility::Hidden => !visible,
            Visibility::All => true,
        }
    }
}

/// Lenient integer query parameter: junk falls back to the default.
pub fn parse_number(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// One page of `items`, `page` counted from 1.
pub fn paginate<T>(items: Vec<T>, page: usize, size: usize) -> Vec<T> {
    let skip = page.saturating_sub(1).saturating_mul(size);
    items.into_iter().skip(skip).take(size).collect()
}

pub fn total_pages(total: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else {
        total.div_ceil(size)
    }
}

/// Case-insensitive substring match.
pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        assert_eq!(
            StatusFilter::parse(None).unwrap(),
            StatusFilter::Only(PublishStatus::Published)
        );
        assert!(!StatusFilter::parse(None).unwrap().requires_auth());
        assert!(StatusFilter::parse(Some("all")).unwrap().requires_auth());
        assert!(StatusFilter::parse(Some("DRAFT")).unwrap().requires_auth());
        assert!(StatusFilter::parse(Some("bogus")).is_err());
    }

    #[test]
    fn test_visibility() {
        assert_eq!(Visibility::parse(None), Visibility::Visible);
        assert_eq!(Visibility::parse(Some("false")), Visibility::Hidden);
        assert!(Visibility::parse(Some("all")).requires_auth());
        assert!(Visibility::Hidden.matches(false));
    }

    #[test]
    fn test_pagination() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(items.clone(), 3, 10), vec![21, 22, 23, 24, 25]);
        assert_eq!(paginate(items.clone(), 0, 10).len(), 10);
        assert!(paginate(items, 9, 10).is_empty());
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(parse_number(Some("abc"), 20), 20);
        assert_eq!(parse_number(Some("5"), 20), 5);
    }

    #[test]
    fn test_entity_key_normalises_uuid() {
        let id = Uuid::new_v4();
        let upper = id.to_string().to_uppercase();
        assert_eq!(entity_key::<Project>(&upper).unwrap(), id.to_string());
        assert!(matches!(
            entity_key::<Project>("not-a-uuid"),
            Err(FolioError::NotFound { entity: "Project" })
        ));
    }
}
