use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::{KeyValueStore, StorageError};

pub const RECENT_SEARCHES_KEY: &str = "jobDashboard_recentSearches";
pub const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Epoch milliseconds of the last time this search ran.
    pub timestamp: i64,
}

impl RecentSearch {
    fn matches(&self, search_text: Option<&str>, city: Option<&str>) -> bool {
        same_term(self.search_text.as_deref(), search_text) && same_term(self.city.as_deref(), city)
    }

    pub fn describe(&self) -> String {
        match (self.search_text.as_deref(), self.city.as_deref()) {
            (Some(text), Some(city)) => format!("{text} in {city}"),
            (Some(text), None) => text.to_string(),
            (None, Some(city)) => format!("anything in {city}"),
            (None, None) => String::new(),
        }
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn same_term(left: Option<&str>, right: Option<&str>) -> bool {
    let left = left.map(|value| value.trim().to_lowercase()).unwrap_or_default();
    let right = right.map(|value| value.trim().to_lowercase()).unwrap_or_default();
    left == right
}

/// Most-recent-first list of the candidate's last searches, persisted on
/// every qualifying record.
pub struct RecentSearches<S: KeyValueStore> {
    store: Arc<S>,
    entries: Vec<RecentSearch>,
}

impl<S: KeyValueStore> RecentSearches<S> {
    /// Loads the persisted list. A corrupt document loads as an empty list.
    pub fn load(store: Arc<S>) -> Result<Self, StorageError> {
        let entries = match store.get(RECENT_SEARCHES_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<RecentSearch>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_RECENT_SEARCHES);
                    entries
                }
                Err(err) => {
                    warn!(error = %err, key = RECENT_SEARCHES_KEY, "discarding corrupt recent searches");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a search. Blank searches are ignored and return `None`; a
    /// repeated `(search_text, city)` pair moves to the top with the new timestamp.
    pub fn record(
        &mut self,
        search_text: Option<&str>,
        city: Option<&str>,
        now_millis: i64,
    ) -> Result<Option<&RecentSearch>, StorageError> {
        let search_text = normalized(search_text);
        let city = normalized(city);
        if search_text.is_none() && city.is_none() {
            return Ok(None);
        }

        let mut next = self.entries.clone();
        let existing = next
            .iter()
            .position(|entry| entry.matches(search_text.as_deref(), city.as_deref()));
        let entry = match existing {
            Some(index) => {
                let mut entry = next.remove(index);
                entry.timestamp = now_millis;
                entry
            }
            None => RecentSearch {
                id: self.next_id(now_millis),
                search_text,
                city,
                timestamp: now_millis,
            },
        };
        debug!(id = %entry.id, repeated = existing.is_some(), "recording recent search");

        next.insert(0, entry);
        next.truncate(MAX_RECENT_SEARCHES);
        self.commit(next)?;
        Ok(self.entries.first())
    }

    pub fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        if !self.entries.iter().any(|entry| entry.id == id) {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(RECENT_SEARCHES_KEY)?;
        self.entries.clear();
        Ok(())
    }

    fn next_id(&self, now_millis: i64) -> String {
        let mut candidate = now_millis.to_string();
        let mut suffix = 1;
        while self.entries.iter().any(|entry| entry.id == candidate) {
            candidate = format!("{now_millis}-{suffix}");
            suffix += 1;
        }
        candidate
    }

    /// Writes `next` and only then makes it the in-memory list.
    fn commit(&mut self, next: Vec<RecentSearch>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&next).map_err(|source| StorageError::Encode {
            key: RECENT_SEARCHES_KEY.to_string(),
            source,
        })?;
        self.store.set(RECENT_SEARCHES_KEY, &encoded)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::search::storage::{MemoryKeyValueStore, ReadOnlyAfterSeed};

    fn fresh() -> (Arc<MemoryKeyValueStore>, RecentSearches<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::default());
        let searches = RecentSearches::load(store.clone()).expect("loads");
        (store, searches)
    }

    #[test]
    fn blank_search_is_not_recorded() {
        let (store, mut searches) = fresh();
        let recorded = searches.record(Some("  "), None, 1).expect("records");
        assert!(recorded.is_none());
        assert!(searches.is_empty());
        assert_eq!(store.get(RECENT_SEARCHES_KEY).expect("reads"), None);
    }

    #[test]
    fn repeat_moves_to_top_without_duplicating() {
        let (_, mut searches) = fresh();
        searches.record(Some("developer"), Some("casablanca"), 1).expect("records");
        searches.record(Some("nurse"), None, 2).expect("records");
        searches.record(Some(" Developer "), Some("Casablanca"), 3).expect("records");

        let entries = searches.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].search_text.as_deref(), Some("developer"));
        assert_eq!(entries[0].timestamp, 3);
        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[1].search_text.as_deref(), Some("nurse"));
    }

    #[test]
    fn list_is_capped_and_evicts_oldest() {
        let (_, mut searches) = fresh();
        for (index, term) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            searches.record(Some(term), None, index as i64).expect("records");
        }
        let terms: Vec<_> = searches
            .entries()
            .iter()
            .filter_map(|entry| entry.search_text.clone())
            .collect();
        assert_eq!(terms, vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn corrupt_document_loads_empty() {
        let store = Arc::new(MemoryKeyValueStore::default());
        store.set(RECENT_SEARCHES_KEY, "{oops").expect("seeds");
        let searches = RecentSearches::load(store).expect("loads");
        assert!(searches.is_empty());
    }

    #[test]
    fn persisted_shape_is_camel_case() {
        let (store, mut searches) = fresh();
        searches.record(Some("developer"), Some("casablanca"), 42).expect("records");
        let raw = store.get(RECENT_SEARCHES_KEY).expect("reads").expect("stored");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value[0]["searchText"], "developer");
        assert_eq!(value[0]["city"], "casablanca");
        assert_eq!(value[0]["timestamp"], 42);
    }

    #[test]
    fn same_millisecond_entries_get_distinct_ids() {
        let (_, mut searches) = fresh();
        searches.record(Some("a"), None, 7).expect("records");
        searches.record(Some("b"), None, 7).expect("records");
        assert_eq!(searches.entries()[0].id, "7-1");
        assert_eq!(searches.entries()[1].id, "7");
    }

    #[test]
    fn remove_and_clear() {
        let (store, mut searches) = fresh();
        searches.record(Some("a"), None, 1).expect("records");
        searches.record(Some("b"), None, 2).expect("records");

        assert!(searches.remove("1").expect("removes"));
        assert!(!searches.remove("1").expect("removes"));
        assert_eq!(searches.entries().len(), 1);

        searches.clear().expect("clears");
        assert!(searches.is_empty());
        assert_eq!(store.get(RECENT_SEARCHES_KEY).expect("reads"), None);
    }

    #[test]
    fn failed_write_keeps_previous_list() {
        let store = Arc::new(ReadOnlyAfterSeed::default());
        let mut searches = RecentSearches::load(store.clone()).expect("loads");
        searches.record(Some("a"), None, 1).expect("records");
        searches.record(Some("b"), None, 2).expect("records");
        let before = searches.entries().to_vec();
        store.lock();

        assert!(searches.record(Some("c"), None, 3).is_err());
        assert!(searches.record(Some("a"), None, 4).is_err());
        assert!(searches.remove("2").is_err());
        assert!(searches.clear().is_err());

        assert_eq!(searches.entries(), before.as_slice());
        let reloaded = RecentSearches::load(store).expect("reloads");
        assert_eq!(reloaded.entries(), before.as_slice());
    }
}
