//! Persistence collaborator interface.
//!
//! The engine never performs I/O itself. Snapshots are pushed to and pulled
//! from these traits by [`crate::LexGraphEngine::persist_to`] and
//! [`crate::LexGraphEngine::hydrate`]; implementations may be backed by
//! anything that can store serde records.

use crate::error::StorageError;
use async_trait::async_trait;
use lexgraph_types::{Case, CaseId, CitationEdge, Court, CourtId, EntityVersion, LogicalId, StatusChangeEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A case with its full status audit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case: Case,
    #[serde(default)]
    pub events: Vec<StatusChangeEvent>,
}

/// Store for versioned entities and case records.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Replace every stored version of `logical_id`.
    async fn put_versions(
        &self,
        logical_id: &LogicalId,
        versions: Vec<EntityVersion>,
    ) -> Result<(), StorageError>;

    async fn get_versions(&self, logical_id: &LogicalId) -> Result<Vec<EntityVersion>, StorageError>;

    /// All stored logical ids, sorted.
    async fn logical_ids(&self) -> Result<Vec<LogicalId>, StorageError>;

    /// Insert or replace a case record.
    async fn put_case(&self, record: CaseRecord) -> Result<(), StorageError>;

    async fn get_case(&self, case_id: &CaseId) -> Result<Option<CaseRecord>, StorageError>;

    /// All stored case ids, sorted.
    async fn case_ids(&self) -> Result<Vec<CaseId>, StorageError>;
}

/// Store for the court hierarchy and citation edges.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert or replace a court together with the courts it is superior to.
    async fn put_court(&self, court: Court, superior_to: Vec<CourtId>) -> Result<(), StorageError>;

    /// Every court with its direct inferiors, sorted by court id.
    async fn courts(&self) -> Result<Vec<(Court, Vec<CourtId>)>, StorageError>;

    /// Replace every outgoing citation of `from`.
    async fn replace_citations(
        &self,
        from: &CaseId,
        edges: Vec<CitationEdge>,
    ) -> Result<(), StorageError>;

    async fn citations_from(&self, from: &CaseId) -> Result<Vec<CitationEdge>, StorageError>;

    /// Cases with at least one outgoing citation, sorted.
    async fn citing_case_ids(&self) -> Result<Vec<CaseId>, StorageError>;
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Io(format!("lock poisoned: {}", e))
}

/// In-memory entity store for testing and development.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    versions: Arc<RwLock<HashMap<LogicalId, Vec<EntityVersion>>>>,
    cases: Arc<RwLock<HashMap<CaseId, CaseRecord>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn put_versions(
        &self,
        logical_id: &LogicalId,
        versions: Vec<EntityVersion>,
    ) -> Result<(), StorageError> {
        if versions.iter().any(|v| v.logical_id != *logical_id) {
            return Err(StorageError::Serialization(format!(
                "version list for {} contains a foreign logical id",
                logical_id
            )));
        }
        let mut store = self.versions.write().map_err(poisoned)?;
        store.insert(logical_id.clone(), versions);
        Ok(())
    }

    async fn get_versions(&self, logical_id: &LogicalId) -> Result<Vec<EntityVersion>, StorageError> {
        let store = self.versions.read().map_err(poisoned)?;
        Ok(store.get(logical_id).cloned().unwrap_or_default())
    }

    async fn logical_ids(&self) -> Result<Vec<LogicalId>, StorageError> {
        let store = self.versions.read().map_err(poisoned)?;
        let mut ids: Vec<LogicalId> = store.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn put_case(&self, record: CaseRecord) -> Result<(), StorageError> {
        let mut store = self.cases.write().map_err(poisoned)?;
        store.insert(record.case.case_id.clone(), record);
        Ok(())
    }

    async fn get_case(&self, case_id: &CaseId) -> Result<Option<CaseRecord>, StorageError> {
        let store = self.cases.read().map_err(poisoned)?;
        Ok(store.get(case_id).cloned())
    }

    async fn case_ids(&self) -> Result<Vec<CaseId>, StorageError> {
        let store = self.cases.read().map_err(poisoned)?;
        let mut ids: Vec<CaseId> = store.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// In-memory graph store for testing and development.
#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    courts: Arc<RwLock<HashMap<CourtId, (Court, Vec<CourtId>)>>>,
    citations: Arc<RwLock<HashMap<CaseId, Vec<CitationEdge>>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn put_court(&self, court: Court, superior_to: Vec<CourtId>) -> Result<(), StorageError> {
        let mut store = self.courts.write().map_err(poisoned)?;
        store.insert(court.court_id.clone(), (court, superior_to));
        Ok(())
    }

    async fn courts(&self) -> Result<Vec<(Court, Vec<CourtId>)>, StorageError> {
        let store = self.courts.read().map_err(poisoned)?;
        let mut courts: Vec<(Court, Vec<CourtId>)> = store.values().cloned().collect();
        courts.sort_by(|a, b| a.0.court_id.cmp(&b.0.court_id));
        Ok(courts)
    }

    async fn replace_citations(
        &self,
        from: &CaseId,
        edges: Vec<CitationEdge>,
    ) -> Result<(), StorageError> {
        if edges.iter().any(|e| e.from != *from) {
            return Err(StorageError::Serialization(format!(
                "citation list for {} contains an edge from another case",
                from
            )));
        }
        let mut store = self.citations.write().map_err(poisoned)?;
        if edges.is_empty() {
            store.remove(from);
        } else {
            store.insert(from.clone(), edges);
        }
        Ok(())
    }

    async fn citations_from(&self, from: &CaseId) -> Result<Vec<CitationEdge>, StorageError> {
        let store = self.citations.read().map_err(poisoned)?;
        Ok(store.get(from).cloned().unwrap_or_default())
    }

    async fn citing_case_ids(&self) -> Result<Vec<CaseId>, StorageError> {
        let store = self.citations.read().map_err(poisoned)?;
        let mut ids: Vec<CaseId> = store.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
