//! Acadify migrate lib, which copies every collection of one mongodb database into another mongodb database.
//!
//! Provides one entry point [migrate], which connects to both endpoints and runs a [Migrator] over them.
//!
//! The copy is a full replace: for every non-empty source collection, the destination collection with the same
//! name is cleared and then filled with the documents read from source.  Destination collections without a
//! source counterpart are left untouched, and the source is never written.
//!
//! Every collection is read into memory before it is written, so a collection must fit into memory to be
//! migrated.  Copying in chunks would change the all-or-nothing replace of one collection, so it's not done here.
//!
//! # migrate example:
//! ```no_run
//! use acadify_migrate::{migrate, MigrateConfig};
//!
//! # async fn run() -> acadify_migrate::Result<()> {
//! let conf = MigrateConfig::load(None, None)?;
//! let report = migrate(&conf).await?;
//! println!("{} documents inserted", report.total_inserted());
//! # Ok(())
//! # }
//! ```
//!
//! # Migrator example:
//! ```no_run
//! use acadify_migrate::{MemoryStore, Migrator};
//! use bson::doc;
//!
//! # async fn run() -> acadify_migrate::Result<()> {
//! let source = MemoryStore::new().with_collection("users", vec![doc! {"name": "ada"}]);
//! let target = MemoryStore::new();
//! let report = Migrator::new(&source, &target).run().await?;
//! assert_eq!(report.total_inserted(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod db;
mod error;
mod memory;
mod migrator;
mod report;
mod store;

/// environment key which holds destination mongodb uri.
pub const DESTINATION_URI_KEY: &str = "MONGODB_ATLAS_URI";
/// source mongodb uri used when nothing else is given.
pub const DEFAULT_SOURCE_URI: &str = "mongodb://127.0.0.1:27017/acadify";
/// database name used when source uri doesn't name one.
pub const DEFAULT_DATABASE: &str = "acadify";
/// collections which are mongodb internal metadata, never copied.
pub const RESERVED_COLLECTIONS: &[&str] = &["system.indexes"];

pub use config::{mask_uri, ConfigFile, Endpoint, MigrateConfig};
pub use db::MongoStore;
pub use error::{MigrateError, Result, Role};
pub use memory::MemoryStore;
pub use migrator::{
    dry_run, is_reserved_collection, migrate, run_and_close, Migrator, PlannedCollection,
};
pub use report::{CollectionOutcome, CollectionReport, MigrationReport};
pub use store::{DocumentStore, StoreCall, StoreError, Step};
