//! In-memory filter persistence, keyed by `(user_id, filter_id)`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterStoreError {
    /// The freshly generated id already existed for this user. Ids are
    /// uuid-v4, so this indicates an entropy or generation defect, not a
    /// user-facing condition.
    #[error("duplicate filter id generated: {0}")]
    DuplicateId(String),
}

/// Stores opaque filter bodies per user and hands back generated ids.
/// Callers never supply the id; the store owns uniqueness.
#[derive(Default)]
pub struct FilterStore {
    filters: DashMap<(String, String), String>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(
        &self,
        user_id: &str,
        filter: impl Into<String>,
    ) -> Result<String, FilterStoreError> {
        let filter_id = Uuid::new_v4().to_string();
        match self
            .filters
            .entry((user_id.to_string(), filter_id.clone()))
        {
            Entry::Occupied(_) => Err(FilterStoreError::DuplicateId(filter_id)),
            Entry::Vacant(slot) => {
                slot.insert(filter.into());
                Ok(filter_id)
            }
        }
    }

    /// Absence is a normal outcome, not an error.
    pub fn load(&self, user_id: &str, filter_id: &str) -> Option<String> {
        self.filters
            .get(&(user_id.to_string(), filter_id.to_string()))
            .map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_returns_the_body() {
        let store = FilterStore::new();
        let id = store.save("alice", r#"{"limit":10}"#).unwrap();
        assert_eq!(store.load("alice", &id).as_deref(), Some(r#"{"limit":10}"#));
    }

    #[test]
    fn repeated_saves_return_distinct_independent_ids() {
        let store = FilterStore::new();
        let first = store.save("alice", r#"{"limit":10}"#).unwrap();
        let second = store.save("alice", r#"{"limit":20}"#).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.load("alice", &first).as_deref(), Some(r#"{"limit":10}"#));
        assert_eq!(store.load("alice", &second).as_deref(), Some(r#"{"limit":20}"#));
    }

    #[test]
    fn unknown_id_is_not_found_not_an_error() {
        let store = FilterStore::new();
        let id = store.save("alice", "{}").unwrap();
        assert_eq!(store.load("alice", "no-such-id"), None);
        // Ids are scoped to the user they were saved for.
        assert_eq!(store.load("bob", &id), None);
    }
}
