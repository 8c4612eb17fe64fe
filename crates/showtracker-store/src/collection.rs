use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::{RecordId, StoreError};

/// A record kept in a [`Collection`]
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> &RecordId;

    /// Apply setters such as trimming and lowercasing before validation
    fn normalize(&mut self) {}

    /// Check schema constraints
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` listing every failing field
    fn validate(&self) -> Result<(), StoreError>;

    /// `(index name, key)` pairs that must be unique across the collection
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Listing order, newest first
    fn sort_key(&self) -> DateTime<Utc>;

    /// Record a modification
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Ordered in-memory document collection
pub struct Collection<T> {
    name: &'static str,
    docs: RwLock<IndexMap<RecordId, T>>,
}

impl<T: Document> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: RwLock::new(IndexMap::new()),
        }
    }

    /// Validate and store a new document
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when a field is rejected and
    /// `StoreError::DuplicateKey` when a unique index already holds the key
    pub async fn insert(&self, mut doc: T) -> Result<T, StoreError> {
        doc.normalize();
        doc.validate()?;

        let mut docs = self.docs.write().await;
        check_unique(self.name, &docs, &doc)?;
        docs.insert(doc.id().clone(), doc.clone());

        tracing::debug!(collection = self.name, id = %doc.id(), "document inserted");

        Ok(doc)
    }

    pub async fn find_one(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.docs.read().await.values().find(|doc| pred(doc)).cloned()
    }

    /// Look a document up by its string id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cast` when `id` is not a valid identifier
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        let id = RecordId::parse(id)?;
        Ok(self.docs.read().await.get(&id).cloned())
    }

    /// Matching documents, newest first, after skipping `skip` of them
    pub async fn find(&self, pred: impl Fn(&T) -> bool, skip: usize, limit: Option<usize>) -> Vec<T> {
        let docs = self.docs.read().await;

        // reversed insertion order keeps ties newest first under a stable sort
        let mut matching: Vec<&T> = docs.values().rev().filter(|doc| pred(doc)).collect();
        matching.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        matching
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub async fn count(&self, pred: impl Fn(&T) -> bool) -> u64 {
        let docs = self.docs.read().await;
        docs.values().filter(|doc| pred(doc)).count() as u64
    }

    /// Modify the document with `id` if it matches `pred`
    ///
    /// The changed document is normalized and validated again before it
    /// replaces the stored one. Returns `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cast` for a malformed id, or whatever `apply`,
    /// validation or the unique indexes reject
    pub async fn update_one(
        &self,
        id: &str,
        pred: impl Fn(&T) -> bool,
        apply: impl FnOnce(&mut T) -> Result<(), StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let id = RecordId::parse(id)?;
        let mut docs = self.docs.write().await;

        let Some(mut doc) = docs.get(&id).filter(|doc| pred(doc)).cloned() else {
            return Ok(None);
        };

        apply(&mut doc)?;
        doc.normalize();
        doc.validate()?;
        check_unique(self.name, &docs, &doc)?;
        doc.touch(Utc::now());

        docs.insert(id, doc.clone());

        Ok(Some(doc))
    }

    /// Remove the document with `id` if it matches `pred`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cast` for a malformed id
    pub async fn delete_one(&self, id: &str, pred: impl Fn(&T) -> bool) -> Result<Option<T>, StoreError> {
        let id = RecordId::parse(id)?;
        let mut docs = self.docs.write().await;

        if !docs.get(&id).is_some_and(|doc| pred(doc)) {
            return Ok(None);
        }

        let removed = docs.shift_remove(&id);
        if removed.is_some() {
            tracing::debug!(collection = self.name, %id, "document deleted");
        }

        Ok(removed)
    }
}

fn check_unique<T: Document>(collection: &str, docs: &IndexMap<RecordId, T>, doc: &T) -> Result<(), StoreError> {
    for (index, key) in doc.unique_keys() {
        let taken = docs
            .values()
            .filter(|other| other.id() != doc.id())
            .any(|other| other.unique_keys().iter().any(|(i, k)| *i == index && *k == key));

        if taken {
            tracing::debug!(collection, index, "unique index violation");
            return Err(StoreError::duplicate(index));
        }
    }
    Ok(())
}
