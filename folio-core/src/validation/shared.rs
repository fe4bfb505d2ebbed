use super::FieldErrors;
use crate::common::error::Result;
use serde::{Deserialize, Deserializer};

/// Patch helper: absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// New display order for a list of entities, first id gets order 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInput {
    pub ordered_ids: Option<Vec<String>>,
}

impl ReorderInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        match &self.ordered_ids {
            None => errors.add("orderedIds", "Required"),
            Some(ids) if ids.is_empty() => errors.add("orderedIds", "At least one id is required"),
            Some(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if id.is_empty() {
                        errors.add(&format!("orderedIds.{i}"), "Must not be empty");
                    }
                }
            }
        }
        errors.into_result()
    }

    pub fn ids(&self) -> &[String] {
        self.ordered_ids.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        value: Option<Option<u8>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        let null: Patch = serde_json::from_value(json!({ "value": null })).unwrap();
        let set: Patch = serde_json::from_value(json!({ "value": 3 })).unwrap();
        assert_eq!(absent.value, None);
        assert_eq!(null.value, Some(None));
        assert_eq!(set.value, Some(Some(3)));
    }

    #[test]
    fn test_reorder_requires_ids() {
        assert!(ReorderInput::default().validate().is_err());
        let empty: ReorderInput = serde_json::from_value(json!({ "orderedIds": [] })).unwrap();
        assert!(empty.validate().is_err());
        let blank: ReorderInput = serde_json::from_value(json!({ "orderedIds": ["a", ""] })).unwrap();
        assert!(blank.validate().is_err());
        let ok: ReorderInput = serde_json::from_value(json!({ "orderedIds": ["a", "b"] })).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.ids(), ["a".to_string(), "b".to_string()]);
    }
}
