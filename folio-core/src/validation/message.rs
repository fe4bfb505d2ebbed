use super::FieldErrors;
use crate::common::error::Result;
use crate::domain::ContactMessage;
use serde::Deserialize;

const MAX_BULK_IDS: usize = 50;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessageUpdateInput {
    pub read: Option<bool>,
    pub archived: Option<bool>,
}

impl MessageUpdateInput {
    pub fn apply(&self, message: &mut ContactMessage) {
        if let Some(read) = self.read {
            message.read = read;
        }
        if let Some(archived) = self.archived {
            message.archived = archived;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBulkUpdateInput {
    pub ids: Option<Vec<String>>,
    pub update: Option<MessageUpdateInput>,
}

impl MessageBulkUpdateInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        match &self.ids {
            None => errors.add("ids", "Required"),
            Some(ids) if ids.is_empty() => errors.add("ids", "At least one ID is required"),
            Some(ids) if ids.len() > MAX_BULK_IDS => {
                errors.add("ids", format!("Maximum {MAX_BULK_IDS} IDs allowed"))
            }
            Some(_) => {}
        }
        if self.update.is_none() {
            errors.add("update", "Required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulk_limits() {
        let ids: Vec<String> = (0..51).map(|i| i.to_string()).collect();
        let too_many: MessageBulkUpdateInput =
            serde_json::from_value(json!({ "ids": ids, "update": { "read": true } })).unwrap();
        assert!(too_many.validate().is_err());

        let missing_update: MessageBulkUpdateInput =
            serde_json::from_value(json!({ "ids": ["a"] })).unwrap();
        assert!(missing_update.validate().is_err());

        let ok: MessageBulkUpdateInput =
            serde_json::from_value(json!({ "ids": ["a"], "update": { "archived": true } })).unwrap();
        assert!(ok.validate().is_ok());
    }
}
