use std::future::Future;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use crate::{Match, MatchId, StoreError};

pub trait MatchStore: Send + Sync {
    /// Stores a new record, failing if the id is taken.
    fn insert(&self, record: &Match) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Match>, StoreError>> + Send;

    /// Overwrites the whole record.
    fn put(&self, record: &Match) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a record and returns how many were removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<usize, StoreError>> + Send;

    fn list_ids(&self) -> impl Future<Output = Result<Vec<MatchId>, StoreError>> + Send;
}

#[derive(Default)]
pub struct MemoryStore {
    documents: DashMap<MatchId, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryStore {
    async fn insert(&self, record: &Match) -> Result<(), StoreError> {
        let document = serde_json::to_string(record)?;
        match self.documents.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(record.id.clone())),
            Entry::Vacant(entry) => {
                entry.insert(document);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Match>, StoreError> {
        match self.documents.get(id) {
            Some(document) => Ok(Some(serde_json::from_str(document.value())?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &Match) -> Result<(), StoreError> {
        let document = serde_json::to_string(record)?;
        self.documents.insert(record.id.clone(), document);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<usize, StoreError> {
        Ok(self.documents.remove(id).map_or(0, |_| 1))
    }

    async fn list_ids(&self) -> Result<Vec<MatchId>, StoreError> {
        let mut ids: Vec<MatchId> = self.documents.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
