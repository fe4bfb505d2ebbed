use super::{contains_ci, delete_by_id, entity_key, paginate, parse_number, total_pages, StatusFilter};
use crate::common::error::{FolioError, Result};
use crate::domain::{BlogPost, BlogPostListItem};
use crate::storage::{Repository, Storage};
use crate::validation::{BlogPostInput, EntityInput, Mode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl PostSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("oldest") => PostSort::Oldest,
            Some("title") => PostSort::Title,
            _ => PostSort::Newest,
        }
    }

    pub fn apply(self, posts: &mut [BlogPost]) {
        match self {
            // Unpublished posts lead the newest-first order and trail the oldest-first one.
            PostSort::Newest => posts.sort_by_key(|p| (p.published_at.is_some(), Reverse(p.published_at))),
            PostSort::Oldest => posts.sort_by_key(|p| (p.published_at.is_none(), p.published_at)),
            PostSort::Title => posts.sort_by(|a, b| a.title.cmp(&b.title)),
        }
    }
}

/// Raw `GET /api/blog` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub status: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PostQuery {
    pub fn status(&self) -> Result<StatusFilter> {
        StatusFilter::parse(self.status.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPageMeta {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone)]
pub struct PostPage {
    pub data: Vec<BlogPostListItem>,
    pub meta: PostPageMeta,
}

#[derive(Clone)]
pub struct BlogService {
    repo: Repository<BlogPost>,
}

impl BlogService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            repo: Repository::new(storage),
        }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<PostPage> {
        let status = query.status()?;
        let tag = query.tag.as_deref().filter(|t| !t.is_empty());
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| (s, s.to_lowercase()));
        let page = parse_number(query.page.as_deref(), 1).max(1);
        let page_size = parse_number(query.page_size.as_deref(), DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let mut posts = self
            .repo
            .filter(|p| {
                status.matches(p.status)
                    && tag.map_or(true, |t| p.tags.iter().any(|pt| pt == t))
                    && search.as_ref().map_or(true, |(raw, lower)| {
                        contains_ci(&p.title, lower)
                            || contains_ci(&p.excerpt, lower)
                            || p.tags.iter().any(|t| t == raw)
                    })
            })
            .await?;
        PostSort::parse(query.sort.as_deref()).apply(&mut posts);

        let total = posts.len();
        let data = paginate(posts, page, page_size)
            .iter()
            .map(BlogPostListItem::from)
            .collect();
        Ok(PostPage {
            data,
            meta: PostPageMeta {
                total,
                page,
                page_size,
                total_pages: total_pages(total, page_size),
            },
        })
    }

    pub async fn get(&self, id: &str) -> Result<BlogPost> {
        self.repo.get(&entity_key::<BlogPost>(id)?).await
    }

    pub async fn create(&self, input: BlogPostInput) -> Result<BlogPost> {
        input.validate(Mode::Create)?;
        let post = input.build(Utc::now());
        self.ensure_slug_free(&post.slug, None).await?;
        self.repo.save(&post).await?;
        info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    pub async fn update(&self, id: &str, input: BlogPostInput) -> Result<BlogPost> {
        let mut post = self.get(id).await?;
        input.validate(Mode::Update)?;
        if let Some(slug) = input.slug.as_deref().filter(|s| *s != post.slug) {
            self.ensure_slug_free(slug, Some(post.id)).await?;
        }
        input.apply(&mut post, Utc::now());
        self.repo.save(&post).await?;
        Ok(post)
    }

    /// Removes the post document only; its media folder is the caller's concern.
    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_by_id(&self.repo, id).await
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> Result<()> {
        match self
            .repo
            .find_by(|p| p.slug == slug && Some(p.id) != except)
            .await?
        {
            Some(_) => Err(FolioError::Conflict(
                "A post with this slug already exists".to_string(),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PublishStatus;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    fn service() -> BlogService {
        BlogService::new(Arc::new(InMemoryStorage::new()))
    }

    fn post(slug: &str, title: &str, published_at: &str, tags: &[&str]) -> BlogPostInput {
        serde_json::from_value(json!({
            "title": title,
            "slug": slug,
            "content": "word ".repeat(450),
            "excerpt": format!("Excerpt for {slug}"),
            "tags": tags,
            "status": "PUBLISHED",
            "publishedAt": published_at,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_sorting_and_tags() {
        let service = service();
        service.create(post("old", "Zebra", "2022-01-01", &["rust"])).await.unwrap();
        service.create(post("new", "Apple", "2024-01-01", &["web"])).await.unwrap();
        service.create(post("mid", "Mango", "2023-01-01", &["rust"])).await.unwrap();

        let slugs = |page: PostPage| page.data.into_iter().map(|p| p.slug).collect::<Vec<_>>();

        let newest = service.list(&PostQuery::default()).await.unwrap();
        assert_eq!(newest.meta.page_size, 10);
        assert_eq!(slugs(newest), vec!["new", "mid", "old"]);

        let oldest = PostQuery { sort: Some("oldest".into()), ..Default::default() };
        assert_eq!(slugs(service.list(&oldest).await.unwrap()), vec!["old", "mid", "new"]);

        let title = PostQuery { sort: Some("title".into()), ..Default::default() };
        assert_eq!(slugs(service.list(&title).await.unwrap()), vec!["new", "mid", "old"]);

        let tagged = PostQuery { tag: Some("rust".into()), ..Default::default() };
        assert_eq!(slugs(service.list(&tagged).await.unwrap()), vec!["mid", "old"]);
    }

    #[tokio::test]
    async fn test_drafts_without_publish_date_sort_first_when_newest() {
        let service = service();
        service.create(post("old", "Old", "2022-01-01", &[])).await.unwrap();
        let mut draft = post("draft", "Draft", "2023-01-01", &[]);
        draft.status = Some(PublishStatus::Draft);
        draft.published_at = None;
        service.create(draft).await.unwrap();
        service.create(post("new", "New", "2024-01-01", &[])).await.unwrap();

        let slugs = |page: PostPage| page.data.into_iter().map(|p| p.slug).collect::<Vec<_>>();
        let newest = PostQuery { status: Some("all".into()), ..Default::default() };
        assert_eq!(slugs(service.list(&newest).await.unwrap()), vec!["draft", "new", "old"]);

        let oldest = PostQuery {
            status: Some("all".into()),
            sort: Some("oldest".into()),
            ..Default::default()
        };
        assert_eq!(slugs(service.list(&oldest).await.unwrap()), vec!["old", "new", "draft"]);
    }

    #[tokio::test]
    async fn test_page_size_is_capped() {
        let service = service();
        let query = PostQuery { page_size: Some("500".into()), ..Default::default() };
        assert_eq!(service.list(&query).await.unwrap().meta.page_size, 50);
    }

    #[tokio::test]
    async fn test_read_time_and_conflict() {
        let service = service();
        let created = service.create(post("hello", "Hello", "2024-01-01", &[])).await.unwrap();
        assert_eq!(created.read_time, 3);
        assert_eq!(created.status, PublishStatus::Published);

        assert!(matches!(
            service.create(post("hello", "Again", "2024-01-01", &[])).await,
            Err(FolioError::Conflict(_))
        ));

        let shorter = BlogPostInput {
            content: Some("just a few words".into()),
            ..Default::default()
        };
        let updated = service.update(&created.id.to_string(), shorter).await.unwrap();
        assert_eq!(updated.read_time, 1);
        assert_eq!(updated.published_at, created.published_at);
    }
}
