//! Document store abstraction that the migrator reads from and writes to.

use async_trait::async_trait;
use bson::Document;
use std::fmt;

/// Error returned by a [DocumentStore] operation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// One step of copying a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// read every document of a source collection.
    Read,
    /// delete every document of a destination collection.
    Clear,
    /// insert documents into a destination collection.
    Insert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Read => "Read",
            Step::Clear => "Clear",
            Step::Insert => "Insert",
        };
        f.write_str(name)
    }
}

/// A call made against a store, recorded by [MemoryStore](crate::MemoryStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// collection names listed.
    List,
    /// documents of collection read.
    Read(String),
    /// documents of collection counted.
    Count(String),
    /// collection cleared.
    Clear(String),
    /// documents inserted into collection, with document count.
    Insert(String, usize),
}

impl StoreCall {
    /// collection name touched by this call, `None` for [StoreCall::List].
    pub fn collection(&self) -> Option<&str> {
        match self {
            StoreCall::List => None,
            StoreCall::Read(c) | StoreCall::Count(c) | StoreCall::Clear(c) => Some(c),
            StoreCall::Insert(c, _) => Some(c),
        }
    }
}

/// A database that holds named collections of schemaless documents.
///
/// Documents are opaque to the migrator, they are moved from one store to another as they are.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// list collection names, in the order the store returns them.
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// read every document in `coll` into memory.
    async fn read_all(&self, coll: &str) -> Result<Vec<Document>, StoreError>;

    /// count documents in `coll`.
    async fn count(&self, coll: &str) -> Result<u64, StoreError>;

    /// delete every document in `coll`, return how many were deleted.
    async fn clear(&self, coll: &str) -> Result<u64, StoreError>;

    /// insert `docs` into `coll` in one batch, return how many were inserted.
    async fn insert_all(&self, coll: &str, docs: Vec<Document>) -> Result<u64, StoreError>;

    /// release the store.
    async fn close(self)
    where
        Self: Sized;
}
