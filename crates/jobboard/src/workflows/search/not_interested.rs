use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use super::storage::{KeyValueStore, StorageError};

pub const NOT_INTERESTED_KEY: &str = "jobDashboard_notInterested";

/// Job ids the candidate dismissed; they are hidden from search results.
pub struct NotInterested<S: KeyValueStore> {
    store: Arc<S>,
    ids: BTreeSet<String>,
}

impl<S: KeyValueStore> NotInterested<S> {
    pub fn load(store: Arc<S>) -> Result<Self, StorageError> {
        let ids = match store.get(NOT_INTERESTED_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_else(|err| {
                    warn!(error = %err, key = NOT_INTERESTED_KEY, "discarding corrupt not-interested list");
                    BTreeSet::new()
                }),
            None => BTreeSet::new(),
        };
        Ok(Self { store, ids })
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.ids.contains(job_id)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    /// Returns `false` when the job was already marked.
    pub fn mark(&mut self, job_id: &str) -> Result<bool, StorageError> {
        if self.ids.contains(job_id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.insert(job_id.to_string());
        self.commit(next)?;
        Ok(true)
    }

    pub fn unmark(&mut self, job_id: &str) -> Result<bool, StorageError> {
        if !self.ids.contains(job_id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.remove(job_id);
        self.commit(next)?;
        Ok(true)
    }

    fn commit(&mut self, next: BTreeSet<String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&next).map_err(|source| StorageError::Encode {
            key: NOT_INTERESTED_KEY.to_string(),
            source,
        })?;
        self.store.set(NOT_INTERESTED_KEY, &encoded)?;
        self.ids = next;
        Ok(())
    }
}
