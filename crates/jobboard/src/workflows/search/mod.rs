//! Candidate-side job search: filtering, recent searches, and dismissed jobs.

pub mod jobs;
pub mod not_interested;
pub mod recent;
pub mod storage;

pub use jobs::{search_jobs, JobListing, JobSearchQuery};
pub use not_interested::{NotInterested, NOT_INTERESTED_KEY};
pub use recent::{RecentSearch, RecentSearches, MAX_RECENT_SEARCHES, RECENT_SEARCHES_KEY};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
