//! In-process document store.

use crate::store::{DocumentStore, Step, StoreCall, StoreError};
use async_trait::async_trait;
use bson::Document;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

/// A [DocumentStore] which keeps collections in memory.
///
/// Every call made against it is recorded, see [calls](MemoryStore::calls).  A step can be made to fail
/// for one collection with [fail_on](MemoryStore::fail_on), which makes it easy to check how a migration
/// behaves when destination goes away in the middle of a run.
///
/// Collections are listed in name order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    colls: BTreeMap<String, Vec<Document>>,
    calls: Vec<StoreCall>,
    failures: HashSet<(Step, String)>,
    fail_listing: bool,
    closed: bool,
}

impl Inner {
    fn check(&self, step: Step, coll: &str) -> Result<(), StoreError> {
        if self.failures.contains(&(step, coll.to_string())) {
            return Err(format!("{} on collection {:?} rejected by memory store", step, coll).into());
        }
        Ok(())
    }
}

impl MemoryStore {
    /// create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// add collection `name` holding `docs`, an empty `docs` creates an empty collection.
    pub fn with_collection(mut self, name: &str, docs: Vec<Document>) -> Self {
        self.inner.get_mut().colls.insert(name.to_string(), docs);
        self
    }

    /// make `step` fail for collection `coll`.
    pub fn fail_on(mut self, step: Step, coll: &str) -> Self {
        self.inner.get_mut().failures.insert((step, coll.to_string()));
        self
    }

    /// make listing collections fail.
    pub fn fail_listing(mut self) -> Self {
        self.inner.get_mut().fail_listing = true;
        self
    }

    /// documents in `coll`, `None` if the collection doesn't exist.
    pub async fn documents(&self, coll: &str) -> Option<Vec<Document>> {
        self.inner.lock().await.colls.get(coll).cloned()
    }

    /// names of existing collections.
    pub async fn collection_names(&self) -> Vec<String> {
        self.inner.lock().await.colls.keys().cloned().collect()
    }

    /// calls made against this store, in call order.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// true once [close](DocumentStore::close) is called on a shared reference of this store.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::List);
        if inner.fail_listing {
            return Err("list collections rejected by memory store".into());
        }
        Ok(inner.colls.keys().cloned().collect())
    }

    async fn read_all(&self, coll: &str) -> Result<Vec<Document>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Read(coll.to_string()));
        inner.check(Step::Read, coll)?;
        Ok(inner.colls.get(coll).cloned().unwrap_or_default())
    }

    async fn count(&self, coll: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Count(coll.to_string()));
        inner.check(Step::Read, coll)?;
        Ok(inner.colls.get(coll).map_or(0, |docs| docs.len() as u64))
    }

    async fn clear(&self, coll: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Clear(coll.to_string()));
        inner.check(Step::Clear, coll)?;
        match inner.colls.get_mut(coll) {
            Some(docs) => {
                let deleted = docs.len() as u64;
                docs.clear();
                Ok(deleted)
            }
            None => Ok(0),
        }
    }

    async fn insert_all(&self, coll: &str, docs: Vec<Document>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .calls
            .push(StoreCall::Insert(coll.to_string(), docs.len()));
        inner.check(Step::Insert, coll)?;
        let inserted = docs.len() as u64;
        inner.colls.entry(coll.to_string()).or_default().extend(docs);
        Ok(inserted)
    }

    async fn close(self) {
        self.inner.lock().await.closed = true;
    }
}

#[async_trait]
impl<'a> DocumentStore for &'a MemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        (**self).list_collection_names().await
    }

    async fn read_all(&self, coll: &str) -> Result<Vec<Document>, StoreError> {
        (**self).read_all(coll).await
    }

    async fn count(&self, coll: &str) -> Result<u64, StoreError> {
        (**self).count(coll).await
    }

    async fn clear(&self, coll: &str) -> Result<u64, StoreError> {
        (**self).clear(coll).await
    }

    async fn insert_all(&self, coll: &str, docs: Vec<Document>) -> Result<u64, StoreError> {
        (**self).insert_all(coll, docs).await
    }

    async fn close(self) {
        self.inner.lock().await.closed = true;
    }
}
