use super::{delete_by_id, entity_key, paginate, parse_number, total_pages};
use crate::common::error::Result;
use crate::domain::ContactMessage;
use crate::storage::{Repository, Storage};
use crate::validation::{ContactInput, MessageBulkUpdateInput, MessageUpdateInput};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 50;

/// Raw `GET /api/messages` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    pub read: Option<String>,
    pub archived: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageMeta {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Unread and unarchived, regardless of the current filter.
    pub unread_count: usize,
}

#[derive(Debug, Clone)]
pub struct MessagePage {
    pub data: Vec<ContactMessage>,
    pub meta: MessagePageMeta,
}

/// The admin inbox.
#[derive(Clone)]
pub struct MessageService {
    repo: Repository<ContactMessage>,
}

impl MessageService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            repo: Repository::new(storage),
        }
    }

    /// Validate and store a contact form submission.
    pub async fn submit(&self, input: ContactInput) -> Result<ContactMessage> {
        input.validate()?;
        let message = input.build(Utc::now());
        self.repo.save(&message).await?;
        info!("Stored contact message {}", message.id);
        Ok(message)
    }

    pub async fn list(&self, query: &MessageQuery) -> Result<MessagePage> {
        let read = match query.read.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        let archived = query.archived.as_deref() == Some("true");
        let page = parse_number(query.page.as_deref(), 1).max(1);
        let page_size = parse_number(query.page_size.as_deref(), DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let all = self.repo.all().await?;
        let unread_count = all.iter().filter(|m| !m.read && !m.archived).count();
        let mut messages: Vec<_> = all
            .into_iter()
            .filter(|m| m.archived == archived && read.map_or(true, |r| m.read == r))
            .collect();
        if query.sort.as_deref() == Some("oldest") {
            messages.sort_by_key(|m| m.created_at);
        } else {
            messages.sort_by_key(|m| Reverse(m.created_at));
        }

        let total = messages.len();
        Ok(MessagePage {
            data: paginate(messages, page, page_size),
            meta: MessagePageMeta {
                total,
                page,
                page_size,
                total_pages: total_pages(total, page_size),
                unread_count,
            },
        })
    }

    /// Opening a message marks it read.
    pub async fn open(&self, id: &str) -> Result<ContactMessage> {
        let mut message = self.repo.get(&entity_key::<ContactMessage>(id)?).await?;
        if !message.read {
            message.read = true;
            self.repo.save(&message).await?;
        }
        Ok(message)
    }

    pub async fn update(&self, id: &str, input: MessageUpdateInput) -> Result<ContactMessage> {
        let mut message = self.repo.get(&entity_key::<ContactMessage>(id)?).await?;
        input.apply(&mut message);
        self.repo.save(&message).await?;
        Ok(message)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_by_id(&self.repo, id).await
    }

    /// Apply one update to every existing message among `ids`; unknown ids are skipped.
    pub async fn bulk_update(&self, input: MessageBulkUpdateInput) -> Result<usize> {
        input.validate()?;
        let update = input.update.unwrap_or_default();
        let mut changed = Vec::new();
        for raw in input.ids.unwrap_or_default() {
            let Ok(key) = entity_key::<ContactMessage>(&raw) else {
                continue;
            };
            if let Some(mut message) = self.repo.find(&key).await? {
                update.apply(&mut message);
                changed.push(message);
            }
        }
        self.repo.save_all(&changed).await?;
        Ok(changed.len())
    }

    pub async fn unread_count(&self) -> Result<usize> {
        self.repo.count(|m| !m.read && !m.archived).await
    }
}
